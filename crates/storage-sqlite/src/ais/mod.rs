mod model;
mod repository;

pub use model::{ShipGeometryDB, ShipInfoDB, StagingRowDB};
pub use repository::AisRepository;
