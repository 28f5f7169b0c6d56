//! Folio - Core
//!
//! Server-rendered pages over a headless content API.
//!
//! # Overview
//!
//! Folio maps URL routes to reads against a Directus-style content API,
//! turns "no such item" into a uniform 404, and hands typed content to
//! askama templates. Every request gets its own content client, bound to a
//! transport built for that request, so forwarded credentials never leak
//! between concurrent renders.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use folio_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = FolioConfig::load()?;
//!     config.validate()?;
//!     folio_core::logging::init_logging(&config.logging.to_logging_config()?)?;
//!
//!     let site = Site::from_config(&config)?;
//!     SiteServer::new(site).serve(&config.server.bind_addr()).await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`content`] - Content client factory, query builder and transports
//! - [`loaders`] - Route data loaders (singleton, collection, single item)
//! - [`render`] - Presentation binder: templates, sanitizer, asset URLs
//! - [`site`] - Route table and per-request wiring
//! - [`http`] - hyper server, router and response helpers
//! - [`config`] - Layered configuration (defaults, TOML, env)
//! - [`logging`] - `log` facade backend

pub mod config; // Configuration system with TOML support
pub mod content; // Content API client and transports
pub mod http;
pub mod loaders;
pub mod logging; // Logging backend for the standard log crate
pub mod model; // Content types owned by the content service
pub mod render;
pub mod site;

pub mod prelude;

pub use config::FolioConfig;
pub use content::{ClientFactory, ContentClient, ContentError, Query, Transport};
pub use loaders::{LoadError, NotFound};
pub use render::Renderer;
pub use site::{Site, SiteServer};

// Main result type for the framework
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Folio
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Content API errors (transport, status, decoding)
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    /// Loader errors (not found or upstream failure)
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    /// Template rendering errors
    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),
    /// HTTP server errors
    #[error("HTTP error: {0}")]
    Http(#[from] http::HttpError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
