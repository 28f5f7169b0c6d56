use std::process::ExitCode;

use anyhow::{Context, Result};
use folio_core::http::RequestContext;
use folio_core::loaders::load_global;
use folio_core::logging::LogOutput;

use super::{build_site, init_logger, load_config};
use crate::SourceArgs;

/// Validate config, then read the global settings once
pub async fn run(source: &SourceArgs) -> Result<ExitCode> {
    let config = load_config(source)?;
    config.validate()?;
    init_logger(&config, LogOutput::Stderr)?;

    let site = build_site(&config, source)?;
    let title = site_title(&site).await?;
    println!("ok: {} ({})", title, config.content.url.as_deref().unwrap_or("-"));
    Ok(ExitCode::SUCCESS)
}

async fn site_title(site: &folio_core::Site) -> Result<String> {
    let client = site.state().client_for(&RequestContext::get("/")?);
    let data = load_global(&client).await.context("could not read the global settings")?;
    Ok(data.global.title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fixtures_source;

    #[tokio::test]
    async fn reads_title_from_fixtures() {
        let source = fixtures_source();
        let config = load_config(&source).unwrap();
        let site = build_site(&config, &source).unwrap();

        assert_eq!(site_title(&site).await.unwrap(), "Folio Demo");
    }
}
