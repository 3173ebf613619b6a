use chrono::{DateTime, Utc};
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::models::parse_timestamp;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).to_string()
}

/// Format a backend timestamp as e.g. "Mar 14, 2025".
/// Unparseable input is returned as-is.
pub fn format_date(date: &str) -> String {
    match parse_timestamp(date) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => date.to_string(),
    }
}

/// English ordinal for a day of the month: 1st, 2nd, 3rd, 4th, 11th, 22nd...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Human-readable age of a timestamp relative to `now`.
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        // Includes negative ages from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Elements whose end starts a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "tr", "table", "blockquote", "section", "article", "h1", "h2",
    "h3", "h4", "h5", "h6",
];

/// Reduce rich text from the backend to plain text.
///
/// `<br>` and the end of block elements become newlines, table cells are
/// separated by a space, `script` and `style` contents are dropped and
/// entities are decoded by the HTML parser. Lines are trimmed and blank
/// lines removed.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    push_text(fragment.root_element(), &mut out);

    out.replace('\u{a0}', " ")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                match name {
                    "script" | "style" => continue,
                    "br" => {
                        out.push('\n');
                        continue;
                    }
                    _ => {}
                }
                if let Some(child) = ElementRef::wrap(child) {
                    push_text(child, out);
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                } else if matches!(name, "td" | "th") {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("বিদ্যালয়", 3), "বিদ");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-14T09:30:00Z"), "Mar 14, 2025");
        assert_eq!(format_date("2025-03-04"), "Mar 04, 2025");
        assert_eq!(format_date("soon"), "soon");
        assert_eq!(format_optional(None, "-"), "-");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now + Duration::minutes(5), now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_age(now - Duration::minutes(90), now), "2h ago");
        assert_eq!(format_age(now - Duration::minutes(80), now), "1h ago");
        assert_eq!(format_age(now - Duration::hours(36), now), "2d ago");
        assert_eq!(format_age(now - Duration::hours(30), now), "1d ago");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html("Line one<br/>Line two"), "Line one\nLine two");
        assert_eq!(
            strip_html("<ul><li>Math</li><li>Physics &amp; Chemistry</li></ul>"),
            "Math\nPhysics & Chemistry"
        );
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html("<p>a</p>\n\n<p>b</p>"), "a\nb");
    }

    #[test]
    fn test_strip_html_keeps_bare_angle_brackets() {
        assert_eq!(strip_html("Fee 5 < 6 and 7 > 3 taka"), "Fee 5 < 6 and 7 > 3 taka");
        assert_eq!(strip_html("<p>x &lt; y</p>"), "x < y");
    }

    #[test]
    fn test_strip_html_decodes_named_entities() {
        assert_eq!(
            strip_html("<p>Hello&nbsp;&mdash;&#39;x&#39; &copy; 2025</p>"),
            "Hello \u{2014}'x' \u{a9} 2025"
        );
    }

    #[test]
    fn test_strip_html_skips_script_and_style() {
        assert_eq!(
            strip_html("<p>Welcome</p><script>alert(1)</script><style>p{color:red}</style>"),
            "Welcome"
        );
    }

    #[test]
    fn test_strip_html_separates_table_cells() {
        assert_eq!(
            strip_html("<table><tr><td>Six</td><td>500</td></tr><tr><td>Seven</td><td>550</td></tr></table>"),
            "Six 500\nSeven 550"
        );
    }
}
