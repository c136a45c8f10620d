use std::str::FromStr;
use std::time::Duration;

use shipwatch_core::buffer::DedupPolicy;
use shipwatch_core::cache::validate_ttl;
use shipwatch_core::constants::{
    DEFAULT_DRAIN_BATCH_SIZE, DEFAULT_GEOMETRY_INTERVAL, DEFAULT_PERSIST_INTERVAL,
    DEFAULT_POLL_INTERVAL,
};
use shipwatch_core::errors::{Error, Result};
use shipwatch_feed::provider::aishub::DEFAULT_URL;

const DEFAULT_DB_PATH: &str = "./db/shipwatch.db";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub db_path: String,
    pub feed_url: String,
    pub feed_username: String,
    pub poll_interval: Duration,
    pub persist_interval: Duration,
    pub geometry_interval: Duration,
    pub keep_history: bool,
    pub drain_batch_size: usize,
    pub dedup_policy: DedupPolicy,
    /// Mirror fetched records into the in-memory cache for this long
    pub cache_ttl: Option<Duration>,
}

impl Config {
    /// Reads `SHIPWATCH_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let feed_username = get("SHIPWATCH_FEED_USERNAME")
            .ok_or_else(|| Error::MissingConfigKey("SHIPWATCH_FEED_USERNAME".to_string()))?;

        let poll_interval = seconds(&get, "SHIPWATCH_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL)?;
        let cache_ttl = get("SHIPWATCH_CACHE_TTL_SECS")
            .map(|v| parse::<u64>("SHIPWATCH_CACHE_TTL_SECS", &v).map(Duration::from_secs))
            .transpose()?;
        if let Some(ttl) = cache_ttl {
            validate_ttl(poll_interval, ttl)?;
        }

        let drain_batch_size = match get("SHIPWATCH_DRAIN_BATCH_SIZE") {
            Some(v) => parse::<usize>("SHIPWATCH_DRAIN_BATCH_SIZE", &v)?,
            None => DEFAULT_DRAIN_BATCH_SIZE,
        };
        if drain_batch_size == 0 {
            return Err(Error::InvalidConfigValue(
                "SHIPWATCH_DRAIN_BATCH_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            db_path: get("SHIPWATCH_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            feed_url: get("SHIPWATCH_FEED_URL").unwrap_or_else(|| DEFAULT_URL.to_string()),
            feed_username,
            poll_interval,
            persist_interval: seconds(
                &get,
                "SHIPWATCH_PERSIST_INTERVAL_SECS",
                DEFAULT_PERSIST_INTERVAL,
            )?,
            geometry_interval: seconds(
                &get,
                "SHIPWATCH_GEOMETRY_INTERVAL_SECS",
                DEFAULT_GEOMETRY_INTERVAL,
            )?,
            keep_history: match get("SHIPWATCH_KEEP_HISTORY") {
                Some(v) => parse_bool("SHIPWATCH_KEEP_HISTORY", &v)?,
                None => true,
            },
            drain_batch_size,
            dedup_policy: match get("SHIPWATCH_DEDUP") {
                Some(v) => DedupPolicy::from_str(&v)?,
                None => DedupPolicy::default(),
            },
            cache_ttl,
        })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| Error::InvalidConfigValue(format!("{}: '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfigValue(format!("{}: '{}'", key, value))),
    }
}

fn seconds<G>(get: &G, key: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => {
            let secs = parse::<u64>(key, &v)?;
            if secs == 0 {
                return Err(Error::InvalidConfigValue(format!("{} must be positive", key)));
            }
            Ok(Duration::from_secs(secs))
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("SHIPWATCH_FEED_USERNAME", "AH_0000_ABCD")]).unwrap();
        assert_eq!(config.db_path, "./db/shipwatch.db");
        assert_eq!(config.feed_url, DEFAULT_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.persist_interval, Duration::from_secs(120));
        assert_eq!(config.geometry_interval, Duration::from_secs(300));
        assert!(config.keep_history);
        assert_eq!(config.drain_batch_size, 10_000);
        assert_eq!(config.dedup_policy, DedupPolicy::Observation);
        assert_eq!(config.cache_ttl, None);
    }

    #[test]
    fn test_username_is_required() {
        assert!(matches!(config(&[]), Err(Error::MissingConfigKey(_))));
        assert!(matches!(
            config(&[("SHIPWATCH_FEED_USERNAME", "  ")]),
            Err(Error::MissingConfigKey(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SHIPWATCH_FEED_USERNAME", "user"),
            ("SHIPWATCH_POLL_INTERVAL_SECS", "30"),
            ("SHIPWATCH_KEEP_HISTORY", "false"),
            ("SHIPWATCH_DEDUP", "vessel"),
            ("SHIPWATCH_DRAIN_BATCH_SIZE", "500"),
            ("SHIPWATCH_CACHE_TTL_SECS", "45"),
        ])
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(!config.keep_history);
        assert_eq!(config.dedup_policy, DedupPolicy::Vessel);
        assert_eq!(config.drain_batch_size, 500);
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_invalid_values() {
        let invalid = |key: &str, value: &str| {
            matches!(
                config(&[("SHIPWATCH_FEED_USERNAME", "user"), (key, value)]),
                Err(Error::InvalidConfigValue(_))
            )
        };
        assert!(invalid("SHIPWATCH_POLL_INTERVAL_SECS", "soon"));
        assert!(invalid("SHIPWATCH_PERSIST_INTERVAL_SECS", "0"));
        assert!(invalid("SHIPWATCH_DRAIN_BATCH_SIZE", "0"));
        assert!(invalid("SHIPWATCH_KEEP_HISTORY", "maybe"));
        assert!(invalid("SHIPWATCH_DEDUP", "fleet"));
        // must lie strictly between one and two poll intervals
        assert!(invalid("SHIPWATCH_CACHE_TTL_SECS", "60"));
        assert!(invalid("SHIPWATCH_CACHE_TTL_SECS", "120"));
    }
}
