//! Content service configuration

use anyhow::{bail, Context, Result};
use http::HeaderName;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::render::MarkupPolicy;

/// `[content]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Base URL of the content API. Required.
    /// Env: FOLIO_CONTENT_URL
    pub url: Option<String>,

    /// Incoming request headers copied onto content reads
    /// Env: FOLIO_FORWARD_HEADERS (comma-separated)
    /// Default: ["cookie", "authorization"]
    pub forward_headers: Vec<String>,

    /// Treatment of rich text
    /// Env: FOLIO_MARKUP (sanitize | trusted)
    /// Default: sanitize
    pub markup: MarkupPolicy,

    /// Unrecognized FOLIO_MARKUP value, reported by `validate`
    #[serde(skip)]
    invalid_markup: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            url: None,
            forward_headers: vec!["cookie".to_string(), "authorization".to_string()],
            markup: MarkupPolicy::Sanitize,
            invalid_markup: None,
        }
    }
}

impl ContentConfig {
    pub fn merge(&mut self, other: Self) {
        if other.url.is_some() {
            self.url = other.url;
        }
        self.forward_headers = other.forward_headers;
        self.markup = other.markup;
        if other.invalid_markup.is_some() {
            self.invalid_markup = other.invalid_markup;
        }
    }

    pub(crate) fn apply_env(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("FOLIO_CONTENT_URL") {
            self.url = Some(url);
        }
        if let Some(headers) = var("FOLIO_FORWARD_HEADERS") {
            self.forward_headers = headers
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }
        if let Some(markup) = var("FOLIO_MARKUP") {
            match markup.parse() {
                Ok(policy) => {
                    self.markup = policy;
                    self.invalid_markup = None;
                }
                Err(_) => self.invalid_markup = Some(markup),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(raw) = &self.invalid_markup {
            bail!("Invalid FOLIO_MARKUP: '{}' (expected sanitize or trusted)", raw);
        }
        self.base_url()?;
        self.forward_header_names()?;
        Ok(())
    }

    /// The parsed content API base URL
    pub fn base_url(&self) -> Result<Url> {
        let Some(raw) = self.url.as_deref() else {
            bail!("content.url is required (set it in folio.toml or FOLIO_CONTENT_URL)");
        };
        let url = Url::parse(raw).with_context(|| format!("Invalid content.url: {}", raw))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Invalid content.url: {} (scheme must be http or https)", raw);
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            bail!("Invalid content.url: {} (must be an absolute URL with a host)", raw);
        }
        Ok(url)
    }

    pub fn forward_header_names(&self) -> Result<Vec<HeaderName>> {
        self.forward_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.trim().as_bytes())
                    .with_context(|| format!("Invalid header name in content.forward_headers: {:?}", name))
            })
            .collect()
    }
}
