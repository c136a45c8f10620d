//! Normalized vessel observation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maritime Mobile Service Identity: the numeric station id of a vessel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mmsi(pub u32);

impl Mmsi {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Mmsi {
    fn from(value: u32) -> Self {
        Mmsi(value)
    }
}

/// WGS84 coordinates, longitude first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Position part of an observation.
///
/// `valid` is authoritative: a position can carry no point and still be a
/// legitimate report (the vessel sent "not available" coordinates).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub point: Option<GeoPoint>,
    pub valid: bool,
    /// Course over ground, degrees
    pub cog: Option<f64>,
    /// Speed over ground, knots
    pub sog: Option<f64>,
    pub heading: Option<i32>,
    /// Position accuracy flag
    pub pac: Option<bool>,
    /// Rate of turn, raw AIS value
    pub rot: Option<i32>,
    /// Navigational status code
    pub navstat: Option<i32>,
}

impl Position {
    /// Builds a position from decimal degrees.
    ///
    /// Out-of-range or non-finite coordinates give an invalid position with
    /// no point; the remaining fields are left for the caller to fill.
    pub fn from_coordinates(longitude: f64, latitude: f64) -> Self {
        let valid = longitude.is_finite()
            && latitude.is_finite()
            && latitude.abs() <= 90.0
            && longitude.abs() <= 180.0;

        Position {
            point: valid.then_some(GeoPoint {
                longitude,
                latitude,
            }),
            valid,
            ..Position::default()
        }
    }

    /// A position explicitly reported as unavailable.
    pub fn invalid() -> Self {
        Position::default()
    }
}

/// Static and voyage information. Every field is independently optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticInfo {
    pub imo: Option<i64>,
    pub callsign: Option<String>,
    pub name: Option<String>,
    pub ship_type: Option<i32>,
    /// Distance from the GPS antenna to the bow, meters
    pub dim_bow: Option<i32>,
    pub dim_stern: Option<i32>,
    pub dim_port: Option<i32>,
    pub dim_starboard: Option<i32>,
    pub eta: Option<DateTime<Utc>>,
    /// Meters
    pub draught: Option<f64>,
    pub destination: Option<String>,
}

/// One normalized AIS observation.
///
/// `(mmsi, time)` is the natural key. Records are never mutated after
/// construction; later reports about the same vessel are new records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub mmsi: Mmsi,
    pub time: DateTime<Utc>,
    pub position: Position,
    pub info: StaticInfo,
}

impl RawRecord {
    pub fn new(mmsi: Mmsi, time: DateTime<Utc>, position: Position, info: StaticInfo) -> Self {
        Self {
            mmsi,
            time,
            position,
            info,
        }
    }

    /// Natural key of the observation.
    pub fn natural_key(&self) -> (Mmsi, DateTime<Utc>) {
        (self.mmsi, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let position = Position::from_coordinates(-3.017903, 53.44996);
        assert!(position.valid);
        assert_eq!(
            position.point,
            Some(GeoPoint {
                longitude: -3.017903,
                latitude: 53.44996
            })
        );
    }

    #[test]
    fn test_out_of_range_coordinates_are_kept_as_invalid() {
        let position = Position::from_coordinates(181.0, 91.0);
        assert!(!position.valid);
        assert!(position.point.is_none());

        let position = Position::from_coordinates(10.0, -90.5);
        assert!(!position.valid);

        let position = Position::from_coordinates(f64::NAN, 10.0);
        assert!(!position.valid);
    }

    #[test]
    fn test_boundaries_are_valid() {
        assert!(Position::from_coordinates(180.0, 90.0).valid);
        assert!(Position::from_coordinates(-180.0, -90.0).valid);
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let record = RawRecord::new(
            Mmsi(232003233),
            DateTime::from_timestamp(1567068530, 0).unwrap(),
            Position::from_coordinates(1.0, 2.0),
            StaticInfo {
                name: Some("SVITZER MERCIA".to_string()),
                ..StaticInfo::default()
            },
        );

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"mmsi\":232003233"));
        let decoded: RawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
