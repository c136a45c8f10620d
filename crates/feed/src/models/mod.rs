//! Feed models
//!
//! - `record` - The normalized observation (RawRecord) and its sub-records
//! - `ship_type` - Static classification of AIS ship type codes

mod record;
pub mod ship_type;

pub use record::{GeoPoint, Mmsi, Position, RawRecord, StaticInfo};
pub use ship_type::ShipType;
