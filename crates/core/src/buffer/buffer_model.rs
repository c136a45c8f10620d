use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shipwatch_feed::{Mmsi, RawRecord};

use crate::errors::{Error, Result};

/// How the buffer identifies duplicate records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// One entry per (vessel, observation time).
    #[default]
    Observation,
    /// One entry per vessel: the first observation buffered wins until drained.
    Vessel,
}

impl DedupPolicy {
    pub fn key_for(self, record: &RawRecord) -> DedupKey {
        match self {
            DedupPolicy::Observation => {
                DedupKey::Observation(record.mmsi, record.time.timestamp_micros())
            }
            DedupPolicy::Vessel => DedupKey::Vessel(record.mmsi),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DedupPolicy::Observation => "observation",
            DedupPolicy::Vessel => "vessel",
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observation" => Ok(DedupPolicy::Observation),
            "vessel" => Ok(DedupPolicy::Vessel),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown dedup policy '{}', expected 'observation' or 'vessel'",
                other
            ))),
        }
    }
}

/// Buffer key. Observation time is kept in microseconds since the epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Vessel(Mmsi),
    Observation(Mmsi, i64),
}

impl DedupKey {
    pub fn mmsi(&self) -> Mmsi {
        match self {
            DedupKey::Vessel(mmsi) | DedupKey::Observation(mmsi, _) => *mmsi,
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::Vessel(mmsi) => write!(f, "{}", mmsi),
            DedupKey::Observation(mmsi, micros) => write!(f, "{}:{}", mmsi, micros),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use shipwatch_feed::{Position, StaticInfo};

    fn record(mmsi: u32, secs: i64) -> RawRecord {
        RawRecord::new(
            Mmsi(mmsi),
            DateTime::from_timestamp(secs, 0).unwrap(),
            Position::invalid(),
            StaticInfo::default(),
        )
    }

    #[test]
    fn test_policy_keys() {
        let r = record(232003233, 1567068530);
        assert_eq!(
            DedupPolicy::Observation.key_for(&r),
            DedupKey::Observation(Mmsi(232003233), 1_567_068_530_000_000)
        );
        assert_eq!(
            DedupPolicy::Vessel.key_for(&r),
            DedupKey::Vessel(Mmsi(232003233))
        );
        assert_eq!(DedupPolicy::Vessel.key_for(&r).mmsi(), Mmsi(232003233));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("vessel".parse::<DedupPolicy>().unwrap(), DedupPolicy::Vessel);
        assert_eq!(
            " Observation ".parse::<DedupPolicy>().unwrap(),
            DedupPolicy::Observation
        );
        assert!(matches!(
            "mmsi".parse::<DedupPolicy>(),
            Err(Error::InvalidConfigValue(_))
        ));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(DedupKey::Observation(Mmsi(1), 42).to_string(), "1:42");
        assert_eq!(DedupKey::Vessel(Mmsi(7)).to_string(), "7");
    }
}
