use cucumber::{then, when};
use folio_core::render::{AssetTransform, AssetUrls};
use reqwest::Url;

use crate::features::world::{FolioWorld, CMS_URL};

#[when(expr = "I build the URL of asset {string} at width {int}")]
async fn when_asset_url(world: &mut FolioWorld, filename: String, width: u32) {
    let assets = AssetUrls::new(Url::parse(CMS_URL).expect("valid URL"));
    world.asset_url = Some(assets.url(&filename, &AssetTransform::width(width)));
}

#[when(expr = "I build the URL of asset {string} without a transform")]
async fn when_asset_url_plain(world: &mut FolioWorld, filename: String) {
    let assets = AssetUrls::new(Url::parse(CMS_URL).expect("valid URL"));
    world.asset_url = Some(assets.url(&filename, &AssetTransform::default()));
}

#[then(expr = "the asset URL is {string}")]
async fn then_asset_url(world: &mut FolioWorld, expected: String) {
    assert_eq!(world.asset_url.as_deref(), Some(expected.as_str()));
}
