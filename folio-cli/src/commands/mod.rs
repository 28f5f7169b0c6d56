pub mod check;
pub mod render;
pub mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_core::config::{FolioConfig, DEFAULT_CONFIG_FILE};
use folio_core::content::MemoryTransport;
use folio_core::logging::{init_logging, LogOutput};
use folio_core::Site;

use crate::SourceArgs;

/// Base URL used for asset links when reading from fixtures without a
/// configured content service
const FIXTURES_CONTENT_URL: &str = "http://localhost:8055";

/// Defaults, config file, then environment
pub fn load_config(source: &SourceArgs) -> Result<FolioConfig> {
    let mut config = match &source.config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
            FolioConfig::load_from(path)?
        }
        None => FolioConfig::load_from(DEFAULT_CONFIG_FILE)?,
    };

    if source.fixtures.is_some() && config.content.url.is_none() {
        config.content.url = Some(FIXTURES_CONTENT_URL.to_string());
    }
    Ok(config)
}

/// Install the logger. Commands that print to stdout log to stderr.
pub fn init_logger(config: &FolioConfig, output: LogOutput) -> Result<()> {
    let logging = config.logging.to_logging_config()?.with_output(output);
    init_logging(&logging)
}

/// A site reading over HTTP, or from `--fixtures` when given
pub fn build_site(config: &FolioConfig, source: &SourceArgs) -> Result<Site> {
    match &source.fixtures {
        Some(path) => {
            let transport = MemoryTransport::from_json_file(path)
                .with_context(|| format!("failed to load fixtures from {}", path.display()))?;
            log::info!("reading content from fixtures {}", path.display());
            Site::with_transport(config, Arc::new(transport))
        }
        None => Site::from_config(config),
    }
}
