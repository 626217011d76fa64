//! Layered configuration (§4.7, §6): compiled defaults → optional TOML file
//! → environment variable overrides, in the same `RunConfig`/`toml` style
//! used elsewhere in this workspace. Invalid configuration is rejected at
//! construction.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tie-break policy when a single tracker candle's range covers both the
/// stop-loss and a target in the same tick (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopVsTargetTieBreak {
    /// Prefer stop-loss over target. Default.
    Conservative,
    /// Prefer target over stop-loss.
    Aggressive,
    /// Resolve by whichever level the candle's intrabar path reaches first,
    /// approximated by open-to-close direction.
    TimestampOrder,
}

impl Default for StopVsTargetTieBreak {
    fn default() -> Self {
        Self::Conservative
    }
}

/// A venue's regular trading session, in minutes from local midnight,
/// applied Monday–Friday. NSE and NYSE both operate single continuous
/// sessions, so this is the only shape venueSessions needs to carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionWindow {
    pub open_minute: u32,
    pub close_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub symbols: Vec<String>,
    pub timeframes: Vec<String>,
    pub generator_period_seconds: u64,
    pub tracker_period_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub min_candles_required: usize,
    pub refresh_interval_seconds: u64,
    pub expiry_seconds: u64,
    pub min_confidence_to_emit: f64,
    pub stop_multiplier: f64,
    pub min_stop_percent: f64,
    pub worker_pool_size: usize,
    pub venue_sessions: HashMap<String, SessionWindow>,
    pub stop_vs_target_tie_break: StopVsTargetTieBreak,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let mut venue_sessions = HashMap::new();
        venue_sessions.insert("NIFTY50".to_string(), SessionWindow { open_minute: 9 * 60 + 15, close_minute: 15 * 60 + 30 });
        venue_sessions.insert("BANKNIFTY".to_string(), SessionWindow { open_minute: 9 * 60 + 15, close_minute: 15 * 60 + 30 });
        venue_sessions.insert("DOWJONES".to_string(), SessionWindow { open_minute: 9 * 60 + 30, close_minute: 16 * 60 });

        Self {
            symbols: vec!["NIFTY50".to_string(), "BANKNIFTY".to_string(), "DOWJONES".to_string()],
            timeframes: vec!["15m".to_string()],
            generator_period_seconds: 60,
            tracker_period_seconds: 60,
            fetch_timeout_seconds: 10,
            min_candles_required: 30,
            refresh_interval_seconds: 120,
            expiry_seconds: 14_400,
            min_confidence_to_emit: 55.0,
            stop_multiplier: 1.5,
            min_stop_percent: 0.005,
            worker_pool_size: num_cpus_fallback(),
            venue_sessions,
            stop_vs_target_tie_break: StopVsTargetTieBreak::default(),
        }
    }
}

/// `num_cpus` is not in the dependency stack; a fixed conservative default
/// stands in for it until a symbol-count-aware pool size is known at load
/// time in `resolve_worker_pool_size`.
fn num_cpus_fallback() -> usize {
    4
}

impl RuntimeConfig {
    /// Compiled defaults, optionally overlaid by a TOML file, optionally
    /// overlaid by `MARKETPULSE_*` environment variables. Returns a
    /// `ConfigError` rather than panicking — this is the one place in the
    /// system where a startup abort is appropriate (§7).
    pub fn load(toml_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = toml_path {
            let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("MARKETPULSE_GENERATOR_PERIOD_SECONDS") {
            if let Ok(n) = v.parse() {
                self.generator_period_seconds = n;
            }
        }
        if let Ok(v) = env::var("MARKETPULSE_TRACKER_PERIOD_SECONDS") {
            if let Ok(n) = v.parse() {
                self.tracker_period_seconds = n;
            }
        }
        if let Ok(v) = env::var("MARKETPULSE_MIN_CONFIDENCE_TO_EMIT") {
            if let Ok(n) = v.parse() {
                self.min_confidence_to_emit = n;
            }
        }
        if let Ok(v) = env::var("MARKETPULSE_WORKER_POOL_SIZE") {
            if let Ok(n) = v.parse() {
                self.worker_pool_size = n;
            }
        }
        if let Ok(v) = env::var("MARKETPULSE_SYMBOLS") {
            self.symbols = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptySymbolSet);
        }
        if self.generator_period_seconds == 0 {
            return Err(ConfigError::NotPositive { field: "generatorPeriodSeconds", value: 0.0 });
        }
        if self.tracker_period_seconds == 0 {
            return Err(ConfigError::NotPositive { field: "trackerPeriodSeconds", value: 0.0 });
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(ConfigError::NotPositive { field: "fetchTimeoutSeconds", value: 0.0 });
        }
        if self.stop_multiplier <= 0.0 {
            return Err(ConfigError::NotPositive { field: "stopMultiplier", value: self.stop_multiplier });
        }
        if self.min_stop_percent <= 0.0 {
            return Err(ConfigError::NotPositive { field: "minStopPercent", value: self.min_stop_percent });
        }
        if self.worker_pool_size == 0 {
            return Err(ConfigError::NotPositive { field: "workerPoolSize", value: 0.0 });
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    pub fn generator_period(&self) -> Duration {
        Duration::from_secs(self.generator_period_seconds)
    }

    pub fn tracker_period(&self) -> Duration {
        Duration::from_secs(self.tracker_period_seconds)
    }

    /// Worker pool capped by the symbol count, per §5 (`min(numCPU, numSymbols)`).
    pub fn resolve_worker_pool_size(&self) -> usize {
        self.worker_pool_size.min(self.symbols.len()).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_symbol_set_rejected() {
        let mut config = RuntimeConfig::default();
        config.symbols.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptySymbolSet)));
    }

    #[test]
    fn zero_generator_period_rejected() {
        let mut config = RuntimeConfig::default();
        config.generator_period_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn worker_pool_capped_by_symbol_count() {
        let mut config = RuntimeConfig::default();
        config.worker_pool_size = 64;
        config.symbols = vec!["A".to_string(), "B".to_string()];
        assert_eq!(config.resolve_worker_pool_size(), 2);
    }
}
