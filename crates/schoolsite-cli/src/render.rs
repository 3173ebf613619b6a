//! Plain-text and JSON rendering of site sections.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Utc};
use serde_json::{json, Value};

use schoolsite_core::models::{Document, InfoItem, Person, SchoolData};
use schoolsite_core::site::views::{
    self, CALENDAR_FALLBACK_DESCRIPTION, GALLERY_PAGE_SIZE, HOME_NOTICE_COUNT, NOTICE_BOARD_COUNT,
};
use schoolsite_core::site::{FeeTable, MediaTile};
use schoolsite_core::utils::{format_age, format_date, format_optional, ordinal, strip_html, truncate_string};
use schoolsite_core::{CacheError, CacheStatus};

use crate::Section;

/// Width used to shorten descriptions in list views.
const SUMMARY_WIDTH: usize = 72;

/// Latest news items shown by the news section.
const NEWS_COUNT: usize = 10;

const MISSING: &str = "-";

pub fn text(data: &SchoolData, section: Section) -> Result<String> {
    let lines = match section {
        Section::About => about(data),
        Section::Notices => notices(data, NOTICE_BOARD_COUNT),
        Section::Notice(id) => notice(data, id)?,
        Section::News => news(data),
        Section::Events => events(data),
        Section::Event(id) => event(data, id)?,
        Section::Teachers => people("Teachers", &data.teachers, "Teacher"),
        Section::Teacher(id) => person_detail(
            views::teacher(data, id).ok_or_else(|| anyhow!("Teacher {} not found", id))?,
            "Teacher",
        ),
        Section::Staff => people("Staff", &data.staff, "Staff"),
        Section::Committee => people("Managing Committee", &data.committee_members, "Member"),
        Section::Leaders => leaders(data),
        Section::Fees => fees(data),
        Section::Gallery(page) => gallery("Photo Gallery", &views::photo_gallery(data), page),
        Section::Videos(page) => gallery("Video Gallery", &views::video_gallery(data), page),
        Section::Achievements => achievements(data),
        Section::Routine => routine(data),
        Section::Calendar => documents(
            "Academic Calendar",
            &views::academic_calendar(data),
            Some(CALENDAR_FALLBACK_DESCRIPTION),
        ),
        Section::ExamSchedule => documents(
            "Exam Schedule",
            &views::exam_schedules(data).iter().collect::<Vec<_>>(),
            None,
        ),
        Section::ExamSystem => info_items("Exam System", views::exam_systems(data), false),
        Section::Admission => info_items("How to Apply", views::admission_steps(data), true),
        Section::Activities => info_items("Extra Activities", views::extra_activities(data), true),
        Section::Lab(lab) => info_items(lab.title(), views::lab_items(data, lab), false),
        Section::History => history(data),
        Section::Vision => vision(data),
        Section::Overview | Section::Status => {
            return Err(anyhow!("{:?} is not a document section", section))
        }
    };
    Ok(lines.join("\n"))
}

pub fn json(data: &SchoolData, section: Section) -> Result<Value> {
    let value = match section {
        Section::About => json!({
            "name": data.name(),
            "eiin": data.eiin,
            "established": data.estd_year,
            "address": data.address,
            "phone": data.primary_phone(),
            "email": data.primary_email(),
            "coordinates": data.coordinates(),
        }),
        Section::Notices => json!(views::latest_notices(data, NOTICE_BOARD_COUNT)),
        Section::Notice(id) => json!(views::notice(data, id).ok_or_else(|| anyhow!("Notice {} not found", id))?),
        Section::News => json!(views::latest_news(data, NEWS_COUNT)),
        Section::Events => json!(data.events),
        Section::Event(id) => json!(views::event(data, id).ok_or_else(|| anyhow!("Event {} not found", id))?),
        Section::Teachers => json!(data.teachers),
        Section::Teacher(id) => json!(views::teacher(data, id).ok_or_else(|| anyhow!("Teacher {} not found", id))?),
        Section::Staff => json!(data.staff),
        Section::Committee => json!(data.committee_members),
        Section::Leaders => json!(views::featured_leaders(data)),
        Section::Fees => json!({
            "fee": views::current_tuition_fee(data),
            "table": views::current_fee_table(data),
        }),
        Section::Gallery(_) => json!(views::photo_gallery(data)),
        Section::Videos(_) => json!(views::video_gallery(data)),
        Section::Achievements => json!(views::published_achievements(data)),
        Section::Routine => json!({
            "routine": views::current_routine(data),
            "table": views::current_routine_table(data),
        }),
        Section::Calendar => json!(views::academic_calendar(data)),
        Section::ExamSchedule => json!(views::exam_schedules(data)),
        Section::ExamSystem => json!(views::exam_systems(data)),
        Section::Admission => json!(views::admission_steps(data)),
        Section::Activities => json!(views::extra_activities(data)),
        Section::Lab(lab) => json!(views::lab_items(data, lab)),
        Section::History => json!(views::history(data)),
        Section::Vision => json!(views::mission_vision(data)),
        Section::Overview | Section::Status => {
            return Err(anyhow!("{:?} is not a document section", section))
        }
    };
    Ok(value)
}

/// Cache report for the status section, with the outcome of the load that
/// preceded it.
pub fn status(
    status: CacheStatus,
    load: Result<&SchoolData, &CacheError>,
    updated: Option<DateTime<Utc>>,
    source: &str,
) -> String {
    let mut lines = vec![format!("Source:  {}", source), format!("Cache:   {:?}", status)];
    if let Some(at) = updated {
        lines.push(format!("Updated: {}", format_age(at, Utc::now())));
    }
    match load {
        Ok(data) => lines.push(format!(
            "Content: {} notices, {} news, {} events, {} teachers, {} staff",
            data.notices.len(),
            data.news.len(),
            data.events.len(),
            data.teachers.len(),
            data.staff.len()
        )),
        Err(err) => lines.push(format!("Error:   {}", err)),
    }
    lines.join("\n")
}

fn heading(title: &str) -> Vec<String> {
    vec![title.to_string(), "=".repeat(title.chars().count())]
}

fn summary(html: Option<&str>) -> String {
    html.map(strip_html)
        .map(|text| truncate_string(&text.replace('\n', " "), SUMMARY_WIDTH))
        .unwrap_or_default()
}

fn date_or_missing(raw: Option<&str>) -> String {
    raw.map(format_date).unwrap_or_else(|| MISSING.to_string())
}

fn about(data: &SchoolData) -> Vec<String> {
    let mut lines = heading(data.name());
    lines.push(format!("EIIN:        {}", format_optional(data.eiin.as_deref(), MISSING)));
    lines.push(format!("Established: {}", format_optional(data.estd_year.as_deref(), MISSING)));
    lines.push(format!("Address:     {}", format_optional(data.address.as_deref(), MISSING)));
    lines.push(format!("Phone:       {}", format_optional(data.primary_phone(), MISSING)));
    lines.push(format!("Email:       {}", format_optional(data.primary_email(), MISSING)));
    if let Some((lat, lon)) = data.coordinates() {
        lines.push(format!("Map:         {:.5}, {:.5}", lat, lon));
    }
    if let Some(about) = data.about_text.as_deref().map(strip_html).filter(|t| !t.is_empty()) {
        lines.push(String::new());
        lines.push(about);
    }
    lines.push(String::new());
    lines.extend(notices(data, HOME_NOTICE_COUNT));
    lines
}

fn notices(data: &SchoolData, limit: usize) -> Vec<String> {
    let mut lines = heading("Notice Board");
    let latest = views::latest_notices(data, limit);
    if latest.is_empty() {
        lines.push("No notices yet.".to_string());
    }
    for n in latest {
        lines.push(format!(
            "[{}] {}  ({})",
            n.id,
            n.title(),
            date_or_missing(n.created_at.as_deref())
        ));
    }
    lines
}

fn notice(data: &SchoolData, id: i64) -> Result<Vec<String>> {
    let n = views::notice(data, id).ok_or_else(|| anyhow!("Notice {} not found", id))?;
    let mut lines = heading(n.title());
    lines.push(format!("Published: {}", date_or_missing(n.created_at.as_deref())));
    if let Some(file) = &n.file {
        lines.push(format!("File:      {}", file));
    }
    if let Some(body) = n.description.as_deref().map(strip_html) {
        lines.push(String::new());
        lines.push(body);
    }
    Ok(lines)
}

fn news(data: &SchoolData) -> Vec<String> {
    let mut lines = heading("News");
    for item in views::latest_news(data, NEWS_COUNT) {
        let date = item
            .published_at()
            .map(|d| d.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| MISSING.to_string());
        lines.push(format!("[{}] {}  ({})", item.id, item.title(), date));
        let body = summary(item.body());
        if !body.is_empty() {
            lines.push(format!("    {}", body));
        }
    }
    lines
}

fn events(data: &SchoolData) -> Vec<String> {
    let mut lines = heading("Events");
    for e in &data.events {
        let date = e
            .event_date()
            .map(|d| format!("{} {}", ordinal(d.day()), d.format("%B %Y")))
            .unwrap_or_else(|| MISSING.to_string());
        lines.push(format!("[{}] {}  ({}, {} media)", e.id, e.title(), date, e.galleries.len()));
    }
    lines
}

fn event(data: &SchoolData, id: i64) -> Result<Vec<String>> {
    let e = views::event(data, id).ok_or_else(|| anyhow!("Event {} not found", id))?;
    let mut lines = heading(e.title());
    lines.push(format!("Date: {}", date_or_missing(e.event_date.as_deref())));
    if let Some(body) = e.description.as_deref().map(strip_html) {
        lines.push(String::new());
        lines.push(body);
    }
    for item in &e.galleries {
        if let Some(media) = &item.media {
            lines.push(format!("  {:?}: {}", item.kind(), media));
        }
    }
    Ok(lines)
}

fn people(title: &str, people: &[Person], fallback_role: &str) -> Vec<String> {
    let mut lines = heading(title);
    for p in people {
        lines.push(format!("[{}] {} ({})", p.id, p.display_name(), p.role_or(fallback_role)));
    }
    lines
}

fn person_detail(p: &Person, fallback_role: &str) -> Vec<String> {
    let mut lines = heading(p.display_name());
    let fields = [
        ("Designation", Some(p.role_or(fallback_role))),
        ("MPO index", p.mpo_index.as_deref()),
        ("Joined", p.joining_date()),
        ("Qualification", p.qualification.as_deref()),
        ("Experience", p.experience.as_deref()),
        ("Email", p.email.as_deref()),
        ("Phone", p.phone.as_deref()),
        ("Address", p.present_address.as_deref()),
    ];
    for (label, value) in fields {
        lines.push(format!("{:<14} {}", format!("{}:", label), format_optional(value, MISSING)));
    }
    lines
}

fn leaders(data: &SchoolData) -> Vec<String> {
    let mut lines = heading("Leadership");
    for l in views::featured_leaders(data) {
        lines.push(format!("{}, {}", format_optional(l.name.as_deref(), "Unnamed"), l.role()));
        let message = summary(l.message.as_deref());
        if !message.is_empty() {
            lines.push(format!("    \"{}\"", message));
        }
    }
    lines
}

fn fees(data: &SchoolData) -> Vec<String> {
    let mut lines = heading("Tuition Fees");
    match views::current_fee_table(data) {
        Some(table) => lines.extend(table_lines(&table)),
        None => lines.push("Fee information is not available.".to_string()),
    }
    lines
}

fn routine(data: &SchoolData) -> Vec<String> {
    let Some(current) = views::current_routine(data) else {
        let mut lines = heading("Class Routine");
        lines.push("Routine is not available.".to_string());
        return lines;
    };
    let mut lines = heading(&format_optional(current.title.as_deref(), "Class Routine"));
    match views::current_routine_table(data) {
        Some(table) => lines.extend(table_lines(&table)),
        None => {
            let body = current.description.as_deref().map(strip_html).unwrap_or_default();
            if !body.is_empty() {
                lines.push(body);
            }
        }
    }
    if let Some(file) = &current.file {
        lines.push(format!("File: {}", file));
    }
    lines
}

fn table_lines(table: &FeeTable) -> Vec<String> {
    let mut lines = Vec::new();
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or_default();
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            std::iter::once(&table.headers)
                .chain(&table.rows)
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or_default()
        })
        .collect();
    if !table.headers.is_empty() {
        lines.push(format_row(&table.headers, &widths));
        lines.push("-".repeat(widths.iter().sum::<usize>() + 3 * columns.saturating_sub(1)));
    }
    for row in &table.rows {
        lines.push(format_row(row, &widths));
    }
    lines
}

fn documents(title: &str, docs: &[&Document], fallback: Option<&str>) -> Vec<String> {
    let mut lines = heading(title);
    if docs.is_empty() {
        lines.push("Nothing published yet.".to_string());
    }
    for doc in docs {
        lines.push(format!(
            "[{}] {}  ({})",
            doc.id,
            format_optional(doc.title.as_deref(), "Untitled"),
            date_or_missing(doc.publish_date.as_deref())
        ));
        let body = summary(doc.description.as_deref());
        match (body.is_empty(), fallback) {
            (false, _) => lines.push(format!("    {}", body)),
            (true, Some(fallback)) => lines.push(format!("    {}", fallback)),
            (true, None) => {}
        }
        if let Some(file) = &doc.file {
            lines.push(format!("    File: {}", file));
        }
    }
    lines
}

/// Titles may carry markup, so both title and body are stripped.
fn info_items(title: &str, items: &[InfoItem], numbered: bool) -> Vec<String> {
    let mut lines = heading(title);
    if items.is_empty() {
        lines.push("Nothing published yet.".to_string());
    }
    for (idx, item) in items.iter().enumerate() {
        let name = item.title.as_deref().map(strip_html).unwrap_or_default();
        match (numbered, name.is_empty()) {
            (true, false) => lines.push(format!("{}. {}", idx + 1, name)),
            (false, false) => lines.push(name),
            (_, true) => {}
        }
        if let Some(body) = item.description.as_deref().map(strip_html).filter(|b| !b.is_empty()) {
            lines.push(body);
        }
        if let Some(media) = &item.media {
            lines.push(format!("Media: {}", media));
        }
    }
    lines
}

fn history(data: &SchoolData) -> Vec<String> {
    let mut lines = heading(&format!("History of {}", data.name()));
    let Some(entry) = views::history(data) else {
        lines.push("History is not available.".to_string());
        return lines;
    };
    if let Some(body) = entry.description.as_deref().map(strip_html).filter(|b| !b.is_empty()) {
        lines.push(body);
    }
    if let Some(image) = &entry.image {
        lines.push(format!("Image: {}", image));
    }
    lines
}

fn vision(data: &SchoolData) -> Vec<String> {
    let mut lines = heading("Mission & Vision");
    let Some(statement) = views::mission_vision(data) else {
        lines.push("Mission and vision are not available.".to_string());
        return lines;
    };
    for (label, text) in [
        ("Mission", statement.mission_text.as_deref()),
        ("Vision", statement.vision_text.as_deref()),
    ] {
        lines.push(String::new());
        lines.push(label.to_string());
        lines.push(format_optional(text.map(strip_html).as_deref(), MISSING));
    }
    lines
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    row.iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn gallery(title: &str, tiles: &[MediaTile], page: usize) -> Vec<String> {
    let page = views::paginate(tiles, page, GALLERY_PAGE_SIZE);
    let mut lines = heading(title);
    if page.items.is_empty() {
        lines.push("Nothing to show.".to_string());
        return lines;
    }
    for tile in page.items {
        lines.push(format!("{}  {}", tile.caption, tile.url));
    }
    lines.push(format!("Page {} of {}", page.page, page.total_pages));
    lines
}

fn achievements(data: &SchoolData) -> Vec<String> {
    let mut lines = heading("Achievements");
    for a in views::published_achievements(data) {
        lines.push(format!("[{}] {}", a.id, format_optional(a.title.as_deref(), "Untitled")));
        let body = summary(a.description.as_deref());
        if !body.is_empty() {
            lines.push(format!("    {}", body));
        }
    }
    lines
}
