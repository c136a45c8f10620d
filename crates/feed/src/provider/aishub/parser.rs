//! Row parsing for AISHub's raw AIS encoding.
//!
//! Coordinates arrive in 1/10000 minute, course/speed/draught in tenths, and
//! ETA as the packed AIS bit field. Numbers may be sent as JSON numbers or as
//! numeric strings.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Mmsi, Position, RawRecord, StaticInfo};

const COORDINATE_SCALE: f64 = 600_000.0;
/// "Not available" coordinates in AIS
const LATITUDE_NOT_AVAILABLE: f64 = 91.0;
const LONGITUDE_NOT_AVAILABLE: f64 = 181.0;

/// ETAs further than this in the past are read as next year's.
const ETA_ROLLOVER_DAYS: i64 = 180;

/// Largest encodable distance from the reference point, in metres.
const MAX_DIM_BOW_STERN: i32 = 511;
const MAX_DIM_PORT_STARBOARD: i32 = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("invalid value for field {0}")]
    InvalidField(&'static str),
}

/// Parse one vessel row.
///
/// `MMSI` and `TIME` are required. Any optional field that is missing or
/// malformed is treated as unavailable.
pub fn parse_record(row: &Map<String, Value>) -> Result<RawRecord, RecordError> {
    let mmsi = required_int(row, "MMSI")?;
    let mmsi = u32::try_from(mmsi).map_err(|_| RecordError::InvalidField("MMSI"))?;

    let timestamp = required_int(row, "TIME")?;
    let time = DateTime::from_timestamp(timestamp, 0).ok_or(RecordError::InvalidField("TIME"))?;

    let latitude = int_field(row, "LATITUDE")
        .map(scale_coordinate)
        .unwrap_or(LATITUDE_NOT_AVAILABLE);
    let longitude = int_field(row, "LONGITUDE")
        .map(scale_coordinate)
        .unwrap_or(LONGITUDE_NOT_AVAILABLE);

    let position = Position {
        cog: tenths(row, "COG"),
        sog: tenths(row, "SOG"),
        heading: i32_field(row, "HEADING"),
        pac: int_field(row, "PAC").map(|v| v != 0),
        rot: i32_field(row, "ROT"),
        navstat: i32_field(row, "NAVSTAT"),
        ..Position::from_coordinates(longitude, latitude)
    };

    let info = StaticInfo {
        imo: int_field(row, "IMO"),
        callsign: Some(text_field(row, "CALLSIGN")),
        name: Some(text_field(row, "NAME")),
        ship_type: i32_field(row, "TYPE"),
        dim_bow: dimension(row, "A", MAX_DIM_BOW_STERN),
        dim_stern: dimension(row, "B", MAX_DIM_BOW_STERN),
        dim_port: dimension(row, "C", MAX_DIM_PORT_STARBOARD),
        dim_starboard: dimension(row, "D", MAX_DIM_PORT_STARBOARD),
        eta: int_field(row, "ETA").and_then(|raw| decode_eta(raw, time)),
        draught: tenths(row, "DRAUGHT"),
        destination: Some(text_field(row, "DEST")),
    };

    Ok(RawRecord::new(Mmsi(mmsi), time, position, info))
}

/// Decode the packed AIS ETA field relative to the observation time.
///
/// Bits: minute 0-5, hour 6-10, day 11-15, month 16-19. The "not available"
/// markers (month 0, day 0, hour 24, minute 60) and impossible dates give
/// `None`.
pub fn decode_eta(raw: i64, observed: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if raw <= 0 {
        return None;
    }
    let minute = (raw & 0x3f) as u32;
    let hour = ((raw >> 6) & 0x1f) as u32;
    let day = ((raw >> 11) & 0x1f) as u32;
    let month = ((raw >> 16) & 0x0f) as u32;

    if month == 0 || day == 0 || hour > 23 || minute > 59 {
        return None;
    }

    let at_year = |year: i32| {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
    };

    let year = observed.year();
    let candidate = at_year(year)?;
    if candidate < observed - Duration::days(ETA_ROLLOVER_DAYS) {
        at_year(year + 1)
    } else {
        Some(candidate)
    }
}

fn scale_coordinate(raw: i64) -> f64 {
    ((raw as f64 / COORDINATE_SCALE) * 1e6).round() / 1e6
}

fn tenths(row: &Map<String, Value>, key: &str) -> Option<f64> {
    float_field(row, key).map(|v| v / 10.0)
}

fn required_int(row: &Map<String, Value>, key: &'static str) -> Result<i64, RecordError> {
    match row.get(key) {
        None | Some(Value::Null) => Err(RecordError::MissingField(key)),
        Some(value) => as_int(value).ok_or(RecordError::InvalidField(key)),
    }
}

fn int_field(row: &Map<String, Value>, key: &str) -> Option<i64> {
    row.get(key).and_then(as_int)
}

fn i32_field(row: &Map<String, Value>, key: &str) -> Option<i32> {
    int_field(row, key).and_then(|v| i32::try_from(v).ok())
}

fn dimension(row: &Map<String, Value>, key: &str, max: i32) -> Option<i32> {
    i32_field(row, key).filter(|v| (0..=max).contains(v))
}

fn float_field(row: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn text_field(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Map<String, Value> {
        let value = json!({
            "MMSI": 232003233, "TIME": "1567068530",
            "LONGITUDE": -1810742, "LATITUDE": 32069976,
            "COG": 1, "SOG": 0, "HEADING": 171, "ROT": 0, "NAVSTAT": 0,
            "IMO": 8914685, "NAME": "SVITZER MERCIA", "CALLSIGN": "MMJY5",
            "TYPE": 52, "A": 20, "B": 12, "C": 5, "D": 5, "DRAUGHT": 54,
            "DEST": "LIVERPOOL TUG OPS", "ETA": 582144, "PAC": 1
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let record = parse_record(&sample_row()).unwrap();

        assert_eq!(record.mmsi, Mmsi(232003233));
        assert_eq!(record.time, ts(1567068530));

        let point = record.position.point.unwrap();
        assert_eq!(point.longitude, -3.017903);
        assert_eq!(point.latitude, 53.44996);
        assert!(record.position.valid);
        assert_eq!(record.position.cog, Some(0.1));
        assert_eq!(record.position.sog, Some(0.0));
        assert_eq!(record.position.heading, Some(171));
        assert_eq!(record.position.rot, Some(0));
        assert_eq!(record.position.navstat, Some(0));
        assert_eq!(record.position.pac, Some(true));

        assert_eq!(record.info.imo, Some(8914685));
        assert_eq!(record.info.name.as_deref(), Some("SVITZER MERCIA"));
        assert_eq!(record.info.callsign.as_deref(), Some("MMJY5"));
        assert_eq!(record.info.destination.as_deref(), Some("LIVERPOOL TUG OPS"));
        assert_eq!(record.info.ship_type, Some(52));
        assert_eq!(record.info.dim_bow, Some(20));
        assert_eq!(record.info.dim_stern, Some(12));
        assert_eq!(record.info.dim_port, Some(5));
        assert_eq!(record.info.dim_starboard, Some(5));
        assert_eq!(record.info.draught, Some(5.4));
        assert_eq!(
            record.info.eta,
            Some(Utc.with_ymd_and_hms(2019, 8, 28, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let mut row = sample_row();
        row.remove("MMSI");
        assert_eq!(
            parse_record(&row).unwrap_err(),
            RecordError::MissingField("MMSI")
        );

        let mut row = sample_row();
        row.remove("TIME");
        assert_eq!(
            parse_record(&row).unwrap_err(),
            RecordError::MissingField("TIME")
        );

        let mut row = sample_row();
        row.insert("TIME".to_string(), json!("yesterday"));
        assert_eq!(
            parse_record(&row).unwrap_err(),
            RecordError::InvalidField("TIME")
        );
    }

    #[test]
    fn test_bad_coordinates_give_invalid_position() {
        let mut row = sample_row();
        row.insert("LATITUDE".to_string(), json!(91 * 600000));
        let record = parse_record(&row).unwrap();
        assert!(!record.position.valid);
        assert!(record.position.point.is_none());
        assert_eq!(record.position.heading, Some(171));

        let mut row = sample_row();
        row.remove("LONGITUDE");
        let record = parse_record(&row).unwrap();
        assert!(!record.position.valid);
    }

    #[test]
    fn test_missing_strings_default_to_empty() {
        let mut row = sample_row();
        row.remove("NAME");
        row.remove("CALLSIGN");
        row.remove("DEST");
        let record = parse_record(&row).unwrap();
        assert_eq!(record.info.name.as_deref(), Some(""));
        assert_eq!(record.info.callsign.as_deref(), Some(""));
        assert_eq!(record.info.destination.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_optional_field_is_unavailable() {
        let mut row = sample_row();
        row.insert("HEADING".to_string(), json!("north"));
        row.insert("DRAUGHT".to_string(), json!(null));
        let record = parse_record(&row).unwrap();
        assert_eq!(record.position.heading, None);
        assert_eq!(record.info.draught, None);
    }

    #[test]
    fn test_out_of_range_dimensions_are_unavailable() {
        let mut row = sample_row();
        row.insert("A".to_string(), json!(2147483647));
        row.insert("B".to_string(), json!(511));
        row.insert("C".to_string(), json!(64));
        row.insert("D".to_string(), json!(-1));
        let record = parse_record(&row).unwrap();
        assert_eq!(record.info.dim_bow, None);
        assert_eq!(record.info.dim_stern, Some(511));
        assert_eq!(record.info.dim_port, None);
        assert_eq!(record.info.dim_starboard, None);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut row = sample_row();
        row.insert("MMSI".to_string(), json!("232003233"));
        row.insert("COG".to_string(), json!("3301"));
        let record = parse_record(&row).unwrap();
        assert_eq!(record.mmsi, Mmsi(232003233));
        assert_eq!(record.position.cog, Some(330.1));
    }

    #[test]
    fn test_decode_eta_rolls_over_to_next_year() {
        let observed = Utc.with_ymd_and_hms(2019, 8, 29, 8, 48, 50).unwrap();
        assert_eq!(
            decode_eta(67649, observed),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 1, 1, 0).unwrap())
        );
    }

    #[test]
    fn test_decode_eta_not_available() {
        let observed = ts(1567068530);
        assert_eq!(decode_eta(0, observed), None);
        // hour 24, minute 60
        assert_eq!(decode_eta((1 << 16) | (1 << 11) | (24 << 6), observed), None);
        assert_eq!(decode_eta((1 << 16) | (1 << 11) | 60, observed), None);
        // 31 February
        assert_eq!(decode_eta((2 << 16) | (31 << 11), observed), None);
    }
}
