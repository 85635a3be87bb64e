use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::manager::DEFAULT_FROM_ADDRESS;

/// Process settings, read from `VENUEBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub metrics_port: Option<u16>,
    /// Compact the WAL once this many events were appended since the last compaction.
    pub compact_threshold: u64,
    pub compact_interval: Duration,
    pub notify_from: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            metrics_port: None,
            compact_threshold: 1000,
            compact_interval: Duration::from_secs(60),
            notify_from: DEFAULT_FROM_ADDRESS.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Self {
            data_dir: lookup("VENUEBOOK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            metrics_port: parsed(&lookup, "VENUEBOOK_METRICS_PORT"),
            compact_threshold: parsed(&lookup, "VENUEBOOK_COMPACT_THRESHOLD")
                .unwrap_or(defaults.compact_threshold),
            compact_interval: parsed(&lookup, "VENUEBOOK_COMPACT_INTERVAL_SECS")
                .filter(|&secs: &u64| {
                    if secs == 0 {
                        tracing::warn!("ignoring VENUEBOOK_COMPACT_INTERVAL_SECS=0: interval must be positive");
                    }
                    secs > 0
                })
                .map(Duration::from_secs)
                .unwrap_or(defaults.compact_interval),
            notify_from: lookup("VENUEBOOK_NOTIFY_FROM").unwrap_or(defaults.notify_from),
        }
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join("venuebook.wal")
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}
