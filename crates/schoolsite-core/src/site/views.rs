//! Page-level views derived from the school document.
//!
//! Each function here is what one page of the site shows: pure selections
//! and orderings over a resolved [`SchoolData`], with no I/O.

use std::cmp::Reverse;

use serde::Serialize;

use crate::models::{
    Achievement, CommitteeMember, Document, Event, HistoryEntry, InfoItem, Leader, MediaKind,
    NewsItem, Notice, SchoolData, StaffMember, Teacher, TuitionFee, VisionStatement,
};

use super::fees::FeeTable;

/// Notices shown in the home page ticker.
pub const HOME_NOTICE_COUNT: usize = 6;

/// Notices shown on the notice board.
pub const NOTICE_BOARD_COUNT: usize = 5;

/// Gallery tiles per page (two rows of four).
pub const GALLERY_PAGE_SIZE: usize = 8;

/// Shown for an academic calendar entry without a description.
pub const CALENDAR_FALLBACK_DESCRIPTION: &str = "Academic schedule and events for the year.";

/// One photo or video drawn from an event gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTile {
    pub event_id: i64,
    pub url: String,
    pub caption: String,
}

/// One page of a longer list. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

/// Slice out `page` of `items`. Out-of-range pages are clamped.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = ((page - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
    }
}

// ===== Notices & News =====

/// Newest notices first (by `created_at`), limited to `limit`.
/// Notices without a parseable timestamp sort last.
pub fn latest_notices(data: &SchoolData, limit: usize) -> Vec<&Notice> {
    let mut notices: Vec<&Notice> = data.notices.iter().collect();
    notices.sort_by_key(|n| Reverse(n.created_at()));
    notices.truncate(limit);
    notices
}

pub fn latest_news(data: &SchoolData, limit: usize) -> Vec<&NewsItem> {
    let mut news: Vec<&NewsItem> = data.news.iter().collect();
    news.sort_by_key(|n| Reverse(n.published_at()));
    news.truncate(limit);
    news
}

pub fn notice(data: &SchoolData, id: i64) -> Option<&Notice> {
    data.notices.iter().find(|n| n.id == id)
}

pub fn news_item(data: &SchoolData, id: i64) -> Option<&NewsItem> {
    data.news.iter().find(|n| n.id == id)
}

// ===== Events & Galleries =====

pub fn event(data: &SchoolData, id: i64) -> Option<&Event> {
    data.events.iter().find(|e| e.id == id)
}

/// Every image across all event galleries, in event order.
pub fn photo_gallery(data: &SchoolData) -> Vec<MediaTile> {
    gallery_tiles(data, MediaKind::Image, "Photo")
}

/// Every mp4 video across all event galleries, in event order.
pub fn video_gallery(data: &SchoolData) -> Vec<MediaTile> {
    gallery_tiles(data, MediaKind::Video, "Video")
}

fn gallery_tiles(data: &SchoolData, kind: MediaKind, fallback: &str) -> Vec<MediaTile> {
    data.events
        .iter()
        .flat_map(|event| {
            event
                .galleries
                .iter()
                .filter(move |item| item.kind() == kind)
                .filter_map(move |item| {
                    let url = item.media.clone()?;
                    let caption = item
                        .caption
                        .clone()
                        .or_else(|| event.title.clone())
                        .unwrap_or_else(|| fallback.to_string());
                    Some(MediaTile {
                        event_id: event.id,
                        url,
                        caption,
                    })
                })
        })
        .collect()
}

// ===== People =====

pub fn teacher(data: &SchoolData, id: i64) -> Option<&Teacher> {
    data.teachers.iter().find(|t| t.id == id)
}

pub fn staff_member(data: &SchoolData, id: i64) -> Option<&StaffMember> {
    data.staff.iter().find(|s| s.id == id)
}

pub fn committee_member(data: &SchoolData, id: i64) -> Option<&CommitteeMember> {
    data.committee_members.iter().find(|m| m.id == id)
}

/// Chairman and principal, in that order. When no leader has either role,
/// every leader is returned in document order.
pub fn featured_leaders(data: &SchoolData) -> Vec<&Leader> {
    let mut featured: Vec<&Leader> = data
        .leaderships
        .iter()
        .filter(|l| role_rank(l.role()) < 2)
        .collect();
    if featured.is_empty() {
        featured = data.leaderships.iter().collect();
    }
    featured.sort_by_key(|l| role_rank(l.role()));
    featured
}

fn role_rank(role: &str) -> u8 {
    let role = role.to_lowercase();
    if role.contains("chairman") {
        0
    } else if role.contains("principal") {
        1
    } else {
        2
    }
}

// ===== Fees & Achievements =====

/// The highest id among published items, or among all items when none is
/// published. Ties go to the earlier item.
fn latest_published<T>(
    items: &[T],
    is_published: impl Fn(&T) -> bool,
    id: impl Fn(&T) -> i64,
) -> Option<&T> {
    items
        .iter()
        .filter(|item| is_published(item))
        .min_by_key(|item| Reverse(id(item)))
        .or_else(|| items.iter().min_by_key(|item| Reverse(id(item))))
}

/// The fee entry to show: the highest id among published entries, or among
/// all entries when none is published.
pub fn current_tuition_fee(data: &SchoolData) -> Option<&TuitionFee> {
    latest_published(&data.tuition_fees, |f| f.is_published == Some(true), |f| f.id)
}

/// The current fee entry's table, if it has one.
pub fn current_fee_table(data: &SchoolData) -> Option<FeeTable> {
    let html = current_tuition_fee(data)?.description.as_deref()?;
    let table = FeeTable::parse(html);
    (!table.is_empty()).then_some(table)
}

/// Published achievements (all of them when none is published), newest id
/// first.
pub fn published_achievements(data: &SchoolData) -> Vec<&Achievement> {
    let mut list: Vec<&Achievement> = data
        .achievements
        .iter()
        .filter(|a| a.is_published == Some(true))
        .collect();
    if list.is_empty() {
        list = data.achievements.iter().collect();
    }
    list.sort_by_key(|a| Reverse(a.id));
    list
}

pub fn achievement(data: &SchoolData, id: i64) -> Option<&Achievement> {
    data.achievements.iter().find(|a| a.id == id)
}

// ===== Schedules & Documents =====

/// The class routine to show, chosen like the tuition fee entry.
pub fn current_routine(data: &SchoolData) -> Option<&Document> {
    latest_published(&data.routines, |r| r.is_published == Some(true), |r| r.id)
}

/// The current routine's table, if it has one.
pub fn current_routine_table(data: &SchoolData) -> Option<FeeTable> {
    let html = current_routine(data)?.description.as_deref()?;
    let table = FeeTable::parse(html);
    (!table.is_empty()).then_some(table)
}

/// Calendar entries that are not explicitly unpublished, in document order.
pub fn academic_calendar(data: &SchoolData) -> Vec<&Document> {
    data.academic_calendars
        .iter()
        .filter(|c| c.is_visible())
        .collect()
}

pub fn exam_schedules(data: &SchoolData) -> &[Document] {
    &data.exam_schedules
}

// ===== Information pages =====

pub fn exam_systems(data: &SchoolData) -> &[InfoItem] {
    &data.exam_systems
}

/// The "how to apply" steps of the admission page.
pub fn admission_steps(data: &SchoolData) -> &[InfoItem] {
    &data.how_to_apply
}

pub fn extra_activities(data: &SchoolData) -> &[InfoItem] {
    &data.extra_activities
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lab {
    Ict,
    Physics,
    Chemistry,
}

impl Lab {
    pub const ALL: [Lab; 3] = [Lab::Ict, Lab::Physics, Lab::Chemistry];

    /// Case-insensitive lookup by short name: `ict`, `physics`, `chemistry`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ict" => Some(Lab::Ict),
            "physics" => Some(Lab::Physics),
            "chemistry" => Some(Lab::Chemistry),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Lab::Ict => "ICT Lab",
            Lab::Physics => "Physics Lab",
            Lab::Chemistry => "Chemistry Lab",
        }
    }
}

pub fn lab_items(data: &SchoolData, lab: Lab) -> &[InfoItem] {
    match lab {
        Lab::Ict => &data.ict_lab_items,
        Lab::Physics => &data.physics_lab_items,
        Lab::Chemistry => &data.chemistry_lab_items,
    }
}

/// The history page entry (the first one).
pub fn history(data: &SchoolData) -> Option<&HistoryEntry> {
    data.school_history.first()
}

/// The mission and vision statement (the first one).
pub fn mission_vision(data: &SchoolData) -> Option<&VisionStatement> {
    data.vision.first()
}
