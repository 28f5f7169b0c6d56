//! Content types
//!
//! These mirror the collections defined in the content service. Folio only
//! reads them; unknown fields in responses are ignored so that richer
//! projections (`*.*`) still decode.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Site-wide settings, stored in the `global` singleton collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub title: String,
    pub description: String,
}

/// A standalone page, looked up by slug in the `pages` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    pub title: String,
    /// Rich text (HTML) authored in the content service
    #[serde(default)]
    pub content: String,
}

/// Author of a post (`authors` collection)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

/// A file stored by the content service (`directus_files`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name on the service's storage, used to build asset URLs
    pub filename_disk: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A blog post with every relation expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "relation::optional")]
    pub image: Option<Asset>,
    #[serde(default, with = "publish_date")]
    pub publish_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "relation::optional")]
    pub author: Option<Author>,
}

/// The listing projection of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    #[serde(default, with = "publish_date")]
    pub publish_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "relation::optional")]
    pub author: Option<Author>,
}

/// Data bag for the home route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalData {
    pub global: GlobalSettings,
}

/// Data bag for the blog listing route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostListing {
    pub posts: Vec<PostSummary>,
}

/// Data bag for a post route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
}

/// Data bag for a page route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetail {
    pub page: Page,
}

/// Dates come back either as `YYYY-MM-DD` (date fields) or as ISO
/// date-times (timestamp fields). Only the calendar date is kept.
mod publish_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse(&s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub(super) fn parse(s: &str) -> Result<NaiveDate, String> {
        let date_part = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| format!("invalid publish_date '{}': {}", s, e))
    }
}

/// A relation field holds either the expanded object or, when the query
/// did not ask for the related fields, just the foreign key. The key alone
/// carries nothing we can render, so it decodes as `None`.
mod relation {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};

    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        match value {
            Some(v @ serde_json::Value::Object(_)) => {
                serde_json::from_value(v).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_with_expanded_relations() {
        let post: Post = serde_json::from_value(json!({
            "slug": "hello-world",
            "title": "Hello World",
            "content": "<p>Hi</p>",
            "image": { "id": "f1", "filename_disk": "abc.jpg", "description": "A cat" },
            "publish_date": "2024-03-01",
            "author": { "id": 1, "name": "Ada" },
            "status": "published"
        }))
        .unwrap();

        assert_eq!(post.image.unwrap().filename_disk, "abc.jpg");
        assert_eq!(post.author.unwrap().name, "Ada");
        assert_eq!(post.publish_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_relation_key_only_decodes_as_none() {
        let post: Post = serde_json::from_value(json!({
            "slug": "a",
            "title": "A",
            "image": "3f1c-uuid",
            "author": 7
        }))
        .unwrap();

        assert!(post.image.is_none());
        assert!(post.author.is_none());
        assert_eq!(post.content, "");
    }

    #[test]
    fn test_publish_date_accepts_datetime() {
        let summary: PostSummary = serde_json::from_value(json!({
            "slug": "a",
            "title": "A",
            "publish_date": "2023-12-24T18:30:00"
        }))
        .unwrap();
        assert_eq!(summary.publish_date, NaiveDate::from_ymd_opt(2023, 12, 24));
    }

    #[test]
    fn test_publish_date_rejects_garbage() {
        let result: Result<PostSummary, _> = serde_json::from_value(json!({
            "slug": "a",
            "title": "A",
            "publish_date": "yesterday"
        }));
        assert!(result.is_err());
        assert!(publish_date::parse("2024-13-01").is_err());
    }

    #[test]
    fn test_data_bag_shape() {
        let bag = GlobalData {
            global: GlobalSettings {
                title: "My Site".to_string(),
                description: "Welcome".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&bag).unwrap(),
            json!({ "global": { "title": "My Site", "description": "Welcome" } })
        );
    }
}
