//! askama view structs
//!
//! Every value here is already in display form: dates formatted, asset URLs
//! built, rich text sanitized. Templates only interpolate.

use askama::Template;

use super::NavLink;

/// Shared layout data for `base.html`
#[derive(Debug, Clone)]
pub struct Layout {
    pub site_name: String,
    pub lang: String,
    pub nav: Vec<NavLink>,
}

#[derive(Debug, Clone)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone)]
pub struct SummaryView {
    pub slug: String,
    pub title: String,
    pub date: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostView {
    pub title: String,
    pub date: Option<String>,
    pub author: Option<String>,
    pub image: Option<ImageView>,
    /// Sanitized markup, emitted unescaped
    pub body: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate<'a> {
    pub layout: &'a Layout,
    pub title: &'a str,
    pub description: &'a str,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate<'a> {
    pub layout: &'a Layout,
    pub posts: Vec<SummaryView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate<'a> {
    pub layout: &'a Layout,
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub layout: &'a Layout,
    pub title: &'a str,
    pub body: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub layout: &'a Layout,
    pub status: u16,
    pub message: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub layout: &'a Layout,
    pub status: u16,
    pub message: &'a str,
}
