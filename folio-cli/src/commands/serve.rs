use std::process::ExitCode;

use anyhow::Result;
use folio_core::config::FolioConfig;
use folio_core::logging::LogOutput;
use folio_core::SiteServer;

use super::{build_site, init_logger, load_config};
use crate::SourceArgs;

/// Flags that override every other config source
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub content_url: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut FolioConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.content_url {
            config.content.url = Some(url);
        }
    }
}

pub async fn run(source: &SourceArgs, overrides: Overrides) -> Result<ExitCode> {
    let mut config = load_config(source)?;
    overrides.apply(&mut config);
    config.validate()?;
    init_logger(&config, LogOutput::Stdout)?;

    let site = build_site(&config, source)?;
    log::info!("folio {} serving content from {}", folio_core::VERSION, config.content.url.as_deref().unwrap_or("-"));
    SiteServer::new(site).serve(&config.server.bind_addr()).await?;
    Ok(ExitCode::SUCCESS)
}
