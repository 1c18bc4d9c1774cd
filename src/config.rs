//! Pruning configuration
//!
//! Configuration file (JSON), every field optional:
//!
//! ```json
//! { "max_extracted_parts_from_between": 16, "log_level": "INFO" }
//! ```
//!
//! The process-wide configuration is built once from defaults and the
//! `PARTITION_PRUNER_MAX_EXTRACTED_PARTS_FROM_BETWEEN` environment variable.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::errors::{PruningError, PruningResult};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Environment variable overriding the between ceiling process-wide
pub const MAX_EXTRACTED_PARTS_FROM_BETWEEN_ENV: &str =
    "PARTITION_PRUNER_MAX_EXTRACTED_PARTS_FROM_BETWEEN";

/// Default ceiling on distinct partitions a between range may expand to
pub const DFLT_MAX_EXTRACTED_PARTS_FROM_BETWEEN: usize = 16;

static GLOBAL: OnceLock<PruningConfig> = OnceLock::new();

/// Pruning configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruningConfig {
    /// A between range touching more distinct partitions than this is not pruned
    #[serde(default = "default_max_extracted_parts_from_between")]
    pub max_extracted_parts_from_between: usize,

    /// Minimum severity written by the logger
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_extracted_parts_from_between() -> usize {
    DFLT_MAX_EXTRACTED_PARTS_FROM_BETWEEN
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            max_extracted_parts_from_between: default_max_extracted_parts_from_between(),
            log_level: default_log_level(),
        }
    }
}

impl PruningConfig {
    /// Config with an explicit between ceiling
    pub fn with_max_extracted_parts_from_between(max: usize) -> Self {
        Self {
            max_extracted_parts_from_between: max,
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file and apply its log level
    pub fn load(path: &Path) -> PruningResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| PruningError::config(format!("Failed to read config: {}", e)))?;

        let config: PruningConfig = serde_json::from_str(&content)
            .map_err(|e| PruningError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        config.apply_logging()?;

        let max = config.max_extracted_parts_from_between.to_string();
        log_event_with_fields(
            Severity::Info,
            Event::ConfigLoaded,
            &[
                ("log_level", config.log_level.as_str()),
                ("max_extracted_parts_from_between", max.as_str()),
            ],
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> PruningResult<()> {
        if self.max_extracted_parts_from_between == 0 {
            return Err(PruningError::config(
                "max_extracted_parts_from_between must be > 0",
            ));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> PruningResult<Severity> {
        self.log_level.parse::<Severity>().map_err(PruningError::config)
    }

    /// Applies the log level to the process-wide logger
    pub fn apply_logging(&self) -> PruningResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }

    /// Process-wide configuration, built on first use
    pub fn global() -> &'static PruningConfig {
        GLOBAL.get_or_init(|| {
            Self::from_env_value(std::env::var(MAX_EXTRACTED_PARTS_FROM_BETWEEN_ENV).ok())
        })
    }

    /// Defaults plus the between-ceiling override, if it parses.
    ///
    /// An unparsable override is reported and ignored.
    fn from_env_value(raw: Option<String>) -> Self {
        let mut config = Self::default();

        let Some(raw) = raw else {
            return config;
        };

        match raw.trim().parse::<usize>() {
            Ok(max) if max > 0 => {
                config.max_extracted_parts_from_between = max;
                log_event_with_fields(
                    Severity::Info,
                    Event::ConfigOverride,
                    &[
                        ("max_extracted_parts_from_between", raw.trim()),
                        ("source", MAX_EXTRACTED_PARTS_FROM_BETWEEN_ENV),
                    ],
                );
            }
            _ => {
                log_event_with_fields(
                    Severity::Warn,
                    Event::ConfigInvalid,
                    &[
                        ("source", MAX_EXTRACTED_PARTS_FROM_BETWEEN_ENV),
                        ("value", raw.as_str()),
                    ],
                );
            }
        }

        config
    }
}
