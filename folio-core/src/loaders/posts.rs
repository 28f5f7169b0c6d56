//! Blog post loaders

use crate::content::{ContentClient, ContentError, Fields, Query, SortField};
use crate::model::{Post, PostDetail, PostListing, PostSummary};

use super::{ItemLoader, LoadError};

/// Posts embed an image and an author, so the detail read expands every
/// relation one level (`*.*`)
pub static POST_LOADER: ItemLoader<Post> = ItemLoader::new("posts", Fields::all_nested, "Post not found");

/// The read behind the blog listing: newest first, with the author's name
pub fn listing_query() -> Query {
    Query::new()
        .fields(Fields::new(["slug", "title", "publish_date", "author.name"]))
        .sort(SortField::desc("publish_date"))
}

/// Load the blog listing.
///
/// No limit is sent, so the service's default page size (100) applies.
/// Failures propagate.
pub async fn load_post_listing(client: &ContentClient) -> Result<PostListing, ContentError> {
    let posts: Vec<PostSummary> = client.read_items("posts", &listing_query()).await?;
    Ok(PostListing { posts })
}

/// Load the post at `/blog/{slug}`
pub async fn load_post(client: &ContentClient, slug: &str) -> Result<PostDetail, LoadError> {
    let post = POST_LOADER.load(client, slug).await?;
    Ok(PostDetail { post })
}
