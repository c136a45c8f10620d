use std::fmt::Write;

use shipwatch_feed::GeoPoint;

/// WGS84
const SRID: u32 = 4326;
const WKB_POINT: u32 = 1;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const LITTLE_ENDIAN: u8 = 1;

/// Renders a point as hex EWKB (little endian, SRID 4326), the textual form
/// PostGIS and SpatiaLite accept for geometry columns.
pub fn encode_point(point: &GeoPoint) -> String {
    let mut bytes = Vec::with_capacity(25);
    bytes.push(LITTLE_ENDIAN);
    bytes.extend_from_slice(&(WKB_POINT | EWKB_SRID_FLAG).to_le_bytes());
    bytes.extend_from_slice(&SRID.to_le_bytes());
    bytes.extend_from_slice(&point.longitude.to_le_bytes());
    bytes.extend_from_slice(&point.latitude.to_le_bytes());

    bytes.iter().fold(String::with_capacity(50), |mut hex, b| {
        let _ = write!(hex, "{:02X}", b);
        hex
    })
}
