//! Asset URL construction
//!
//! Images are never processed locally. Resizing and format conversion are
//! requested from the content service through query parameters.

use reqwest::Url;

/// Transformation parameters understood by the asset endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTransform {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// `cover`, `contain`, `inside` or `outside`
    pub fit: Option<String>,
    pub quality: Option<u8>,
    /// `jpg`, `png`, `webp`, `avif` or `auto`
    pub format: Option<String>,
}

impl AssetTransform {
    pub fn width(width: u32) -> Self {
        Self { width: Some(width), ..Default::default() }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(w) = self.width {
            pairs.push(("width", w.to_string()));
        }
        if let Some(h) = self.height {
            pairs.push(("height", h.to_string()));
        }
        if let Some(fit) = &self.fit {
            pairs.push(("fit", fit.clone()));
        }
        if let Some(q) = self.quality {
            pairs.push(("quality", q.to_string()));
        }
        if let Some(format) = &self.format {
            pairs.push(("format", format.clone()));
        }
        pairs
    }
}

/// Builds display URLs for stored files
#[derive(Debug, Clone)]
pub struct AssetUrls {
    base_url: Url,
}

impl AssetUrls {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// `{base}/assets/{filename}[?width=..&height=..&fit=..&quality=..&format=..]`
    pub fn url(&self, filename: &str, transform: &AssetTransform) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("assets").push(filename);
        }

        let pairs = transform.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url.to_string()
    }
}
