//! Common imports for applications embedding Folio
//!
//! ```rust,ignore
//! use folio_core::prelude::*;
//! ```

pub use crate::config::FolioConfig;
pub use crate::content::{
    ClientFactory, ContentClient, ContentError, ContentStore, Fields, HttpTransport, Limit,
    MemoryTransport, Query, SortField, Transport,
};
pub use crate::http::RequestContext;
pub use crate::loaders::{load_global, load_page, load_post, load_post_listing, LoadError, NotFound};
pub use crate::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
pub use crate::model::{GlobalData, PageDetail, PostDetail, PostListing};
pub use crate::render::{AssetTransform, AssetUrls, MarkupPolicy, Renderer};
pub use crate::site::{Site, SiteServer};
