use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de, parse_timestamp};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notice {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    /// Attached document (usually a PDF link).
    #[serde(default, deserialize_with = "de::text")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub created_at: Option<String>,
}

impl Notice {
    pub fn title(&self) -> &str {
        self.title.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub created_at: Option<String>,
}

impl NewsItem {
    pub fn title(&self) -> &str {
        self.title.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Publication time: `created_at`, falling back to `date`.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.date.as_deref().and_then(parse_timestamp))
    }

    /// Body text: `description`, falling back to `content`.
    pub fn body(&self) -> Option<&str> {
        self.description.as_deref().or(self.content.as_deref())
    }
}
