//! TOML configuration for the recommender.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! standard GEM setup: five London-listed ETFs, SPY benchmark, 12-1 window,
//! 4 h cache TTL. Environment overrides are applied after parsing and
//! before validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gem_core::cache::{CacheConfig, DEFAULT_CAPACITY, DEFAULT_TTL};
use gem_core::data::stooq::DEFAULT_BASE_URL;
use gem_core::domain::{AssetClass, Instrument, Ticker, Universe};
use gem_core::error::ValidationFailure;
use gem_core::returns::TrailingWindow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::{LogConfig, LogFormat};

pub const ENV_LOG_LEVEL: &str = "GEM_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "GEM_LOG_FORMAT";
pub const ENV_CACHE_TTL_HOURS: &str = "GEM_CACHE_TTL_HOURS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("instrument universe is empty")]
    EmptyUniverse,

    #[error("instrument '{0}' is configured more than once")]
    DuplicateInstrument(String),

    #[error("instrument '{name}' has an invalid symbol: {source}")]
    InvalidSymbol {
        name: String,
        #[source]
        source: ValidationFailure,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Quote source and cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub base_url: String,
    pub cache_ttl_hours: f64,
    pub cache_capacity: usize,
    pub fetch_timeout_secs: u64,
    /// Fetch instruments concurrently.
    pub parallel_fetch: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_hours: 4.0,
            cache_capacity: DEFAULT_CAPACITY,
            fetch_timeout_secs: 10,
            parallel_fetch: true,
        }
    }
}

/// Momentum window in calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub lookback_months: u32,
    pub skip_months: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let w = TrailingWindow::default();
        Self {
            lookback_months: w.lookback_months,
            skip_months: w.skip_months,
        }
    }
}

/// Reference index reported alongside the universe. Never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub name: String,
    pub symbol: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            name: "S&P 500 (SPY)".to_string(),
            symbol: "spy.us".to_string(),
        }
    }
}

/// One `[[instruments]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    pub symbol: String,
    pub class: AssetClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Complete recommender configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemConfig {
    pub data: DataConfig,
    pub strategy: StrategyConfig,
    pub benchmark: BenchmarkConfig,
    pub instruments: Vec<InstrumentConfig>,
    pub logging: LoggingConfig,
}

impl Default for GemConfig {
    fn default() -> Self {
        let instruments = Universe::default_gem()
            .instruments()
            .iter()
            .map(|i| InstrumentConfig {
                name: i.name.clone(),
                symbol: i.symbol.to_string(),
                class: i.class,
            })
            .collect();

        Self {
            data: DataConfig::default(),
            strategy: StrategyConfig::default(),
            benchmark: BenchmarkConfig::default(),
            instruments,
            logging: LoggingConfig::default(),
        }
    }
}

impl GemConfig {
    /// Load from a file, or defaults when `path` is `None`; then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Does not validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a TOML string. Does not validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `GEM_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = raw
                .trim()
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: ENV_LOG_FORMAT,
                    reason,
                })?;
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_HOURS) {
            self.data.cache_ttl_hours =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseFloatError| ConfigError::InvalidValue {
                        field: ENV_CACHE_TTL_HOURS,
                        reason: e.to_string(),
                    })?;
        }
        Ok(())
    }

    /// Check every constraint the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.data.cache_ttl_hours;
        if !ttl.is_finite() || ttl <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "data.cache_ttl_hours",
                reason: format!("must be a positive number, got {ttl}"),
            });
        }
        if self.data.cache_capacity == 0 {
            return Err(invalid("data.cache_capacity", "must be at least 1"));
        }
        if self.data.fetch_timeout_secs == 0 {
            return Err(invalid("data.fetch_timeout_secs", "must be at least 1"));
        }
        if self.data.base_url.trim().is_empty() {
            return Err(invalid("data.base_url", "must not be empty"));
        }
        if self.strategy.lookback_months == 0 {
            return Err(invalid("strategy.lookback_months", "must be at least 1"));
        }
        if self.benchmark.name.trim().is_empty() {
            return Err(invalid("benchmark.name", "must not be empty"));
        }
        Ticker::parse(&self.benchmark.symbol).map_err(|source| ConfigError::InvalidSymbol {
            name: self.benchmark.name.clone(),
            source,
        })?;
        self.universe()?;
        Ok(())
    }

    /// Ordered instrument universe, with names unique and symbols valid.
    pub fn universe(&self) -> Result<Universe, ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }

        let mut seen = HashSet::new();
        let mut instruments = Vec::with_capacity(self.instruments.len());
        for entry in &self.instruments {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateInstrument(entry.name.clone()));
            }
            let symbol =
                Ticker::parse(&entry.symbol).map_err(|source| ConfigError::InvalidSymbol {
                    name: entry.name.clone(),
                    source,
                })?;
            instruments.push(Instrument::new(entry.name.clone(), symbol, entry.class));
        }
        Ok(Universe::new(instruments))
    }

    pub fn benchmark_ticker(&self) -> Result<Ticker, ConfigError> {
        Ticker::parse(&self.benchmark.symbol).map_err(|source| ConfigError::InvalidSymbol {
            name: self.benchmark.name.clone(),
            source,
        })
    }

    pub fn window(&self) -> TrailingWindow {
        TrailingWindow::new(self.strategy.lookback_months, self.strategy.skip_months)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::try_from_secs_f64(self.data.cache_ttl_hours * 3600.0).unwrap_or(DEFAULT_TTL)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl(),
            capacity: self.data.cache_capacity,
            window: self.window(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.data.fetch_timeout_secs)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.logging.level.clone()).with_format(self.logging.format)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}
