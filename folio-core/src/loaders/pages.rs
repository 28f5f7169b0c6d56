//! Page loader

use crate::content::{ContentClient, Fields};
use crate::model::{Page, PageDetail};

use super::{ItemLoader, LoadError};

/// Pages have no relations, so every top-level field is enough
pub static PAGE_LOADER: ItemLoader<Page> = ItemLoader::new("pages", Fields::all, "Page not found");

/// Load the page at `/{slug}`
pub async fn load_page(client: &ContentClient, slug: &str) -> Result<PageDetail, LoadError> {
    let page = PAGE_LOADER.load(client, slug).await?;
    Ok(PageDetail { page })
}
