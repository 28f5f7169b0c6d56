//! Rich-text trust boundary
//!
//! Markup authored in the content service is untrusted by default and goes
//! through an allow-list sanitizer before it reaches a page.

use serde::{Deserialize, Serialize};

/// How rich text from the content service is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupPolicy {
    /// Strip everything outside the allow-list
    #[default]
    Sanitize,
    /// Emit markup as authored. Only for content sources fully under the
    /// site owner's control.
    Trusted,
}

impl std::str::FromStr for MarkupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sanitize" => Ok(MarkupPolicy::Sanitize),
            "trusted" => Ok(MarkupPolicy::Trusted),
            other => Err(format!("unknown markup policy '{}' (expected sanitize or trusted)", other)),
        }
    }
}

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Applies a [`MarkupPolicy`] to rich text
pub struct Sanitizer {
    policy: MarkupPolicy,
    cleaner: ammonia::Builder<'static>,
}

impl Sanitizer {
    pub fn new(policy: MarkupPolicy) -> Self {
        let mut cleaner = ammonia::Builder::default();
        cleaner.add_tag_attributes("img", &["loading"]);
        // Anchor targets on headings only; ids elsewhere can clobber DOM globals
        for heading in HEADINGS {
            cleaner.add_tag_attributes(heading, &["id"]);
        }
        Self { policy, cleaner }
    }

    pub fn policy(&self) -> MarkupPolicy {
        self.policy
    }

    pub fn clean(&self, markup: &str) -> String {
        match self.policy {
            MarkupPolicy::Sanitize => self.cleaner.clean(markup).to_string(),
            MarkupPolicy::Trusted => markup.to_string(),
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(MarkupPolicy::default())
    }
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer").field("policy", &self.policy).finish()
    }
}
