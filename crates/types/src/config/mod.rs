// Path: crates/types/src/config/mod.rs

//! Configuration for the in-memory history store (`history.toml`).
use crate::error::HistoryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retention and collection settings for the history store.
///
/// Every field has a serde default, so an empty or partial TOML table is a
/// valid configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// If true, plain (non-tombstone) values become eligible for whole-key
    /// collection once their newest version is older than the horizon.
    /// Defaults to false, so only deletions are dropped wholesale.
    #[serde(default)]
    pub purge: bool,
    /// The minimum wall-clock age, in milliseconds, before a recency-buffer
    /// entry may drive trimming. Defaults to 10_000.
    #[serde(default = "default_min_age_ms")]
    pub min_age_ms: u64,
    /// The capacity of the recency buffer. Defaults to 65_536.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// The interval in milliseconds between background collection sweeps.
    /// Defaults to 60_000.
    #[serde(default = "default_gc_interval_ms")]
    pub gc_interval_ms: u64,
    /// If true, an empty pending registry places no constraint on
    /// collection. If false, collection is skipped until some operation is
    /// pending and a horizon can be computed. Defaults to true.
    #[serde(default = "default_true")]
    pub collect_when_idle: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            purge: false,
            min_age_ms: default_min_age_ms(),
            max_size: default_max_size(),
            gc_interval_ms: default_gc_interval_ms(),
            collect_when_idle: default_true(),
        }
    }
}

impl HistoryConfig {
    /// Validates the configuration for semantic correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("Configuration Error: 'max_size' must be greater than 0.".to_string());
        }

        if self.gc_interval_ms == 0 {
            return Err(
                "Configuration Error: 'gc_interval_ms' must be greater than 0.".to_string(),
            );
        }

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, HistoryError> {
        let config: Self =
            toml::from_str(s).map_err(|e| HistoryError::InvalidConfig(e.to_string()))?;
        config.validate().map_err(HistoryError::InvalidConfig)?;
        Ok(config)
    }

    /// `min_age_ms` as a `Duration`.
    pub fn min_age(&self) -> Duration {
        Duration::from_millis(self.min_age_ms)
    }

    /// `gc_interval_ms` as a `Duration`.
    pub fn gc_interval(&self) -> Duration {
        Duration::from_millis(self.gc_interval_ms)
    }
}

fn default_min_age_ms() -> u64 {
    10_000
}

fn default_max_size() -> usize {
    65_536
}

fn default_gc_interval_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}
