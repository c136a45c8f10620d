//! AIS store module - load reports, derived geometry and repository traits.

mod ais_model;
mod ais_traits;

pub use ais_model::{LoadReport, ShipGeometry};
pub use ais_traits::{BulkLoadRepositoryTrait, ShipGeometryRepositoryTrait};
