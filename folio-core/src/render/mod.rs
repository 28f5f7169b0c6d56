//! Presentation binder
//!
//! Turns loader data bags into HTML. Performs no I/O: everything a view
//! needs (asset base URL, layout, markup policy) is fixed at construction.

pub mod assets;
pub mod sanitize;
mod templates;

use askama::Template;
use chrono::NaiveDate;
use http::StatusCode;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::loaders::NotFound;
use crate::model::{GlobalData, PageDetail, PostDetail, PostListing};

pub use assets::{AssetTransform, AssetUrls};
pub use sanitize::{MarkupPolicy, Sanitizer};

use templates::{
    BlogTemplate, ErrorTemplate, HomeTemplate, ImageView, Layout, NotFoundTemplate, PageTemplate,
    PostTemplate, PostView, SummaryView,
};

/// Display format for publish dates, e.g. `February 1, 2024`
pub const DATE_FORMAT: &str = "%B %-d, %Y";

/// Default rendered width for post images
pub const DEFAULT_IMAGE_WIDTH: u32 = 600;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

/// A link in the site navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self { label: label.into(), href: href.into() }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub site_name: String,
    pub lang: String,
    pub nav: Vec<NavLink>,
    /// Base URL of the content service; assets live under `{base}/assets`
    pub asset_base: Url,
    pub image_width: u32,
    pub markup: MarkupPolicy,
}

impl RenderOptions {
    pub fn new(asset_base: Url) -> Self {
        Self {
            site_name: "Folio".to_string(),
            lang: "en".to_string(),
            nav: vec![NavLink::new("Home", "/"), NavLink::new("Blog", "/blog")],
            asset_base,
            image_width: DEFAULT_IMAGE_WIDTH,
            markup: MarkupPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct Renderer {
    layout: Layout,
    assets: AssetUrls,
    sanitizer: Sanitizer,
    image_width: u32,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        if options.markup == MarkupPolicy::Trusted {
            log::warn!("rich text is rendered without sanitization (markup = trusted)");
        }
        Self {
            layout: Layout { site_name: options.site_name, lang: options.lang, nav: options.nav },
            assets: AssetUrls::new(options.asset_base),
            sanitizer: Sanitizer::new(options.markup),
            image_width: options.image_width,
        }
    }

    pub fn assets(&self) -> &AssetUrls {
        &self.assets
    }

    pub fn render_home(&self, data: &GlobalData) -> Result<String, RenderError> {
        let template = HomeTemplate {
            layout: &self.layout,
            title: &data.global.title,
            description: &data.global.description,
        };
        Ok(template.render()?)
    }

    pub fn render_listing(&self, data: &PostListing) -> Result<String, RenderError> {
        let posts = data
            .posts
            .iter()
            .map(|post| SummaryView {
                slug: post.slug.clone(),
                title: post.title.clone(),
                date: post.publish_date.map(format_date),
                author: post.author.as_ref().map(|a| a.name.clone()),
            })
            .collect();
        Ok(BlogTemplate { layout: &self.layout, posts }.render()?)
    }

    pub fn render_post(&self, data: &PostDetail) -> Result<String, RenderError> {
        let post = &data.post;
        let transform = AssetTransform::width(self.image_width);
        let view = PostView {
            title: post.title.clone(),
            date: post.publish_date.map(format_date),
            author: post.author.as_ref().map(|a| a.name.clone()),
            image: post.image.as_ref().map(|asset| ImageView {
                src: self.assets.url(&asset.filename_disk, &transform),
                alt: asset.description.clone().unwrap_or_default(),
            }),
            body: self.sanitizer.clean(&post.content),
        };
        Ok(PostTemplate { layout: &self.layout, post: view }.render()?)
    }

    pub fn render_page(&self, data: &PageDetail) -> Result<String, RenderError> {
        let template = PageTemplate {
            layout: &self.layout,
            title: &data.page.title,
            body: self.sanitizer.clean(&data.page.content),
        };
        Ok(template.render()?)
    }

    pub fn render_not_found(&self, not_found: &NotFound) -> Result<String, RenderError> {
        let template = NotFoundTemplate {
            layout: &self.layout,
            status: not_found.status.as_u16(),
            message: &not_found.message,
        };
        Ok(template.render()?)
    }

    /// Generic error page. `message` is shown to the visitor, so it must not
    /// carry fault details.
    pub fn render_error(&self, status: StatusCode, message: &str) -> Result<String, RenderError> {
        let template = ErrorTemplate { layout: &self.layout, status: status.as_u16(), message };
        Ok(template.render()?)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
