use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de, parse_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify a media URL by extension, ignoring case and any query string.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" => MediaKind::Image,
            "mp4" => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de::list")]
    pub galleries: Vec<GalleryItem>,
}

impl Event {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn event_date(&self) -> Option<DateTime<Utc>> {
        self.event_date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub media: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub caption: Option<String>,
}

impl GalleryItem {
    pub fn kind(&self) -> MediaKind {
        self.media
            .as_deref()
            .map(MediaKind::from_url)
            .unwrap_or(MediaKind::Other)
    }
}
