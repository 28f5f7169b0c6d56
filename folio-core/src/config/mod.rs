//! Configuration system for Folio
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **CLI flags** - applied by the `folio` binary after loading
//! 2. **Environment Variables** - `FOLIO_*`
//! 3. **Config File** - `folio.toml`, every key optional
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use folio_core::config::FolioConfig;
//!
//! let config = FolioConfig::load()?;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ```toml
//! [server]
//! port = 3000
//!
//! [content]
//! url = "https://cms.example.com"
//! forward_headers = ["cookie", "authorization"]
//!
//! [site]
//! name = "My Site"
//! nav = [{ label = "Home", href = "/" }, { label = "About", href = "/about" }]
//! ```

pub mod content;
pub mod logging;
pub mod server;
pub mod site;

pub use content::ContentConfig;
pub use logging::LoggingSection;
pub use server::ServerConfig;
pub use site::SiteConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Complete Folio configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub server: ServerConfig,
    pub content: ContentConfig,
    pub site: SiteConfig,
    pub logging: LoggingSection,
}

impl FolioConfig {
    /// Defaults, then `folio.toml` if present, then environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Defaults, then `path` if it exists, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        Ok(config)
    }

    /// Parse a TOML file; keys it omits keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.server.merge(other.server);
        self.content.merge(other.content);
        self.site.merge(other.site);
        self.logging.merge(other.logging);
    }

    /// Apply `FOLIO_*` environment variables
    pub fn apply_env_vars(&mut self) {
        self.apply_env(&|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_env(&mut self, var: &impl Fn(&str) -> Option<String>) {
        self.server.apply_env(var);
        self.content.apply_env(var);
        self.site.apply_env(var);
        self.logging.apply_env(var);
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.content.validate()?;
        self.site.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
