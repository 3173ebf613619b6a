use serde::{Deserialize, Serialize};

use super::de;

/// A tuition fee announcement. `description` holds an HTML table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuitionFee {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "de::text")]
    pub created_at: Option<String>,
}

/// A downloadable document: class routine, academic calendar, exam schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub publish_date: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_published: Option<bool>,
}

impl Document {
    /// Documents are shown unless explicitly unpublished.
    pub fn is_visible(&self) -> bool {
        self.is_published != Some(false)
    }
}

/// A titled block of rich text with optional media: exam system, admission
/// steps, extra activities, lab descriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoItem {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub media: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_visibility() {
        let doc: Document = serde_json::from_str(r#"{"id": 1, "title": "Calendar 2025"}"#).unwrap();
        assert!(doc.is_visible());
        let doc: Document = serde_json::from_str(r#"{"id": 2, "is_published": 0}"#).unwrap();
        assert!(!doc.is_visible());
    }

    #[test]
    fn test_tuition_fee_flag_forms() {
        let fee: TuitionFee =
            serde_json::from_str(r#"{"id": "4", "is_published": "1", "description": "<table></table>"}"#)
                .unwrap();
        assert_eq!(fee.id, 4);
        assert_eq!(fee.is_published, Some(true));
    }
}
