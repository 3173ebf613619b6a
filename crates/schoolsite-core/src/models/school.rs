use serde::{Deserialize, Serialize};

use super::de;
use super::{
    Achievement, CommitteeMember, Document, Event, InfoItem, Leader, NewsItem, Notice,
    StaffMember, Teacher, TuitionFee,
};

/// The whole school document served from the API root.
///
/// Every scalar is optional and every collection defaults to empty, so a
/// partially filled-in school still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolData {
    // ===== Identity =====
    #[serde(default, deserialize_with = "de::text")]
    pub school_name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub eiin: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub estd_year: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub logo: Option<String>,
    /// May contain HTML.
    #[serde(default, deserialize_with = "de::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::list")]
    pub contract_phones: Vec<ContactPhone>,
    #[serde(default, deserialize_with = "de::list")]
    pub contract_emails: Vec<ContactEmail>,
    #[serde(default, deserialize_with = "de::text")]
    pub about_text: Option<String>,
    #[serde(default, deserialize_with = "de::list")]
    pub school_history: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "de::list")]
    pub vision: Vec<VisionStatement>,
    #[serde(default, deserialize_with = "de::text")]
    pub map_latitude: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub map_longitude: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub facebook_url: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub youtube_link: Option<String>,

    // ===== People =====
    #[serde(default, deserialize_with = "de::list")]
    pub teachers: Vec<Teacher>,
    #[serde(default, deserialize_with = "de::list")]
    pub staff: Vec<StaffMember>,
    #[serde(default, deserialize_with = "de::list")]
    pub leaderships: Vec<Leader>,
    #[serde(default, deserialize_with = "de::list")]
    pub committee_members: Vec<CommitteeMember>,

    // ===== Content =====
    #[serde(default, deserialize_with = "de::list")]
    pub notices: Vec<Notice>,
    #[serde(default, deserialize_with = "de::list")]
    pub news: Vec<NewsItem>,
    #[serde(default, deserialize_with = "de::list")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "de::list")]
    pub achievements: Vec<Achievement>,
    #[serde(default, deserialize_with = "de::list")]
    pub tuition_fees: Vec<TuitionFee>,
    #[serde(default, deserialize_with = "de::list")]
    pub routines: Vec<Document>,
    #[serde(default, deserialize_with = "de::list")]
    pub academic_calendars: Vec<Document>,
    #[serde(default, deserialize_with = "de::list")]
    pub exam_schedules: Vec<Document>,
    #[serde(default, deserialize_with = "de::list")]
    pub exam_systems: Vec<InfoItem>,
    #[serde(default, deserialize_with = "de::list")]
    pub how_to_apply: Vec<InfoItem>,
    #[serde(default, deserialize_with = "de::list")]
    pub extra_activities: Vec<InfoItem>,
    #[serde(default, deserialize_with = "de::list")]
    pub ict_lab_items: Vec<InfoItem>,
    #[serde(default, deserialize_with = "de::list")]
    pub physics_lab_items: Vec<InfoItem>,
    #[serde(default, deserialize_with = "de::list")]
    pub chemistry_lab_items: Vec<InfoItem>,
}

/// Phone entries use either `phone` or `number`, depending on who entered them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPhone {
    #[serde(default, deserialize_with = "de::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactEmail {
    #[serde(default, deserialize_with = "de::text")]
    pub email: Option<String>,
}

/// The school history page. Only the first entry is shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    /// Rich text.
    #[serde(default, deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub image: Option<String>,
}

/// Mission and vision statements, both rich text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionStatement {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub mission_text: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub vision_text: Option<String>,
}

impl SchoolData {
    pub fn name(&self) -> &str {
        self.school_name.as_deref().unwrap_or("School")
    }

    pub fn primary_phone(&self) -> Option<&str> {
        self.contract_phones
            .iter()
            .find_map(|p| p.phone.as_deref().or(p.number.as_deref()))
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.contract_emails.iter().find_map(|e| e.email.as_deref())
    }

    /// Map coordinates, when both are present and numeric.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.map_latitude.as_deref()?.trim().parse().ok()?;
        let lon = self.map_longitude.as_deref()?.trim().parse().ok()?;
        Some((lat, lon))
    }
}
