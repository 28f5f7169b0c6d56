//! Logging configuration section

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{LogFormat, LogLevel, LoggingConfig};

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Env: FOLIO_LOG_LEVEL
    pub level: String,
    /// `human`, `json` or `logfmt`
    /// Env: FOLIO_LOG_FORMAT
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "human".to_string() }
    }
}

impl LoggingSection {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub(crate) fn apply_env(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(level) = var("FOLIO_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = var("FOLIO_LOG_FORMAT") {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.to_logging_config().map(|_| ())
    }

    /// Resolve into the logger's own configuration
    pub fn to_logging_config(&self) -> Result<LoggingConfig> {
        let level: LogLevel = self.level.parse().map_err(|e| anyhow!("Invalid logging.level: {}", e))?;
        let format: LogFormat =
            self.format.parse().map_err(|e| anyhow!("Invalid logging.format: {}", e))?;
        Ok(LoggingConfig::default().with_level(level).with_format(format))
    }
}
