//! Site presentation configuration

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::render::{NavLink, DEFAULT_IMAGE_WIDTH};

/// `[site]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Shown in the header and page titles
    /// Env: FOLIO_SITE_NAME
    pub name: String,

    /// `<html lang>`
    /// Env: FOLIO_SITE_LANG
    pub lang: String,

    /// Header navigation, as `[[site.nav]]` tables
    pub nav: Vec<NavLink>,

    /// Directory served under `/static/`
    /// Env: FOLIO_STATIC_DIR
    pub static_dir: Option<PathBuf>,

    /// Width requested for post images
    /// Env: FOLIO_IMAGE_WIDTH
    pub image_width: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Folio".to_string(),
            lang: "en".to_string(),
            nav: vec![NavLink::new("Home", "/"), NavLink::new("Blog", "/blog")],
            static_dir: None,
            image_width: DEFAULT_IMAGE_WIDTH,
        }
    }
}

impl SiteConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub(crate) fn apply_env(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(name) = var("FOLIO_SITE_NAME") {
            self.name = name;
        }
        if let Some(lang) = var("FOLIO_SITE_LANG") {
            self.lang = lang;
        }
        if let Some(dir) = var("FOLIO_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(width) = var("FOLIO_IMAGE_WIDTH") {
            match width.parse() {
                Ok(w) => self.image_width = w,
                Err(_) => log::warn!("ignoring FOLIO_IMAGE_WIDTH={}: not a number", width),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 {
            bail!("Invalid site.image_width: must be greater than 0");
        }
        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                bail!("site.static_dir not found: {}", dir.display());
            }
        }
        Ok(())
    }
}
