use std::process::ExitCode;

use anyhow::{Context, Result};
use folio_core::http::RequestContext;
use folio_core::logging::LogOutput;
use folio_core::Site;
use http::{header, StatusCode};
use http_body_util::BodyExt;

use super::{build_site, init_logger, load_config};
use crate::SourceArgs;

/// Render `path` in-process and print the body. Non-2xx exits with 1.
pub async fn run(source: &SourceArgs, path: &str, json: bool) -> Result<ExitCode> {
    let config = load_config(source)?;
    config.validate()?;
    init_logger(&config, LogOutput::Stderr)?;

    let site = build_site(&config, source)?;
    let (status, body) = render(&site, path, json).await?;
    println!("{}", body);

    if status.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{} responded {}", path, status);
        Ok(ExitCode::FAILURE)
    }
}

async fn render(site: &Site, path: &str, json: bool) -> Result<(StatusCode, String)> {
    let path = if path.starts_with('/') { path.to_string() } else { format!("/{}", path) };
    let mut ctx = RequestContext::get(&path).with_context(|| format!("invalid route path: {}", path))?;
    if json {
        ctx = ctx.with_header(header::ACCEPT, "application/json");
    }

    let resp = site.handle_logged(ctx).await;
    let status = resp.status();
    let bytes = resp.into_body().collect().await.context("failed to read response body")?.to_bytes();
    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fixtures_source;

    async fn demo_site() -> Site {
        let source = fixtures_source();
        let config = load_config(&source).unwrap();
        build_site(&config, &source).unwrap()
    }

    #[tokio::test]
    async fn renders_post() {
        let (status, html) = render(&demo_site().await, "blog/analytical-engine", false).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Notes on the Analytical Engine"));
        assert!(html.contains("4f1c-engine.jpg?width=600"));
    }

    #[tokio::test]
    async fn renders_listing_as_json() {
        let (status, body) = render(&demo_site().await, "/blog", true).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(r#"{"posts":"#));
        assert!(body.find("first-compiler").unwrap() < body.find("analytical-engine").unwrap());
    }

    #[tokio::test]
    async fn unparseable_path_is_an_error() {
        let err = render(&demo_site().await, "/blog/no such post", false).await.unwrap_err();
        assert!(err.to_string().contains("invalid route path"));
    }

    #[tokio::test]
    async fn missing_post_is_not_success() {
        let (status, html) = render(&demo_site().await, "/blog/hello-world", false).await.unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Post not found"));
    }
}
