//! Data models for the school document.
//!
//! The backend serves one JSON document describing the whole school. This
//! module contains the structures it is parsed into:
//!
//! - `SchoolData`: the document root with identity fields and every collection
//! - `HistoryEntry`, `VisionStatement`: the about pages
//! - `Person`, `Leader`: teachers, staff, committee members and leadership
//! - `Notice`, `NewsItem`: announcements
//! - `Event`, `GalleryItem`: events and their photo/video galleries
//! - `TuitionFee`, `Achievement`, `Document`, `InfoItem`: academic content

pub mod academic;
pub(crate) mod de;
pub mod event;
pub mod notice;
pub mod person;
pub mod school;

pub use academic::{Achievement, Document, InfoItem, TuitionFee};
pub use event::{Event, GalleryItem, MediaKind};
pub use notice::{NewsItem, Notice};
pub use person::{CommitteeMember, Designation, Leader, Person, StaffMember, Teacher, Tenure};
pub use school::{ContactEmail, ContactPhone, HistoryEntry, SchoolData, VisionStatement};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse the timestamp formats the backend emits: RFC 3339,
/// `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` (taken as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
