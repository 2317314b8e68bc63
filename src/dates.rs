use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::data_models::TimeFilter;

static JSON_LD_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector")
});
static TIME_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("static selector"));

/// Meta conventions for publication dates, probed in priority order.
const META_TARGETS: &[(&str, &str)] = &[
    ("property", "article:published_time"),
    ("name", "date"),
    ("name", "pubdate"),
    ("name", "original-publish-date"),
    ("name", "publication_date"),
    ("property", "og:published_time"),
    ("name", "DC.date.issued"),
    ("name", "citation_date"),
];

/// Infer a publication datetime from a fetched document.
///
/// Ordered cascade, first success wins; a parse failure at any step falls
/// through to the next, never aborts the whole inference:
/// 1. JSON-LD structured data (`datePublished` / `dateCreated` / `uploadDate`)
/// 2. publication-date meta tags
/// 3. a `/YYYY/MM/DD/` segment in the source URL
/// 4. a visible `<time datetime="…">` element
pub fn infer_published_at(html: &str, url: &str) -> Option<NaiveDateTime> {
    let document = Html::parse_document(html);

    from_json_ld(&document)
        .or_else(|| from_meta_tags(&document))
        .or_else(|| from_url_path(url))
        .or_else(|| from_time_element(&document))
}

fn from_json_ld(document: &Html) -> Option<NaiveDateTime> {
    for script in document.select(&JSON_LD_SEL) {
        let raw: String = script.text().collect();
        let Ok(mut data) = serde_json::from_str::<serde_json::Value>(raw.trim()) else {
            continue;
        };
        // A top-level list means several entities; take the first.
        if let Some(first) = data.as_array().and_then(|a| a.first()) {
            data = first.clone();
        }
        let date_str = data
            .get("datePublished")
            .or_else(|| data.get("dateCreated"))
            .or_else(|| data.get("uploadDate"))
            .and_then(|v| v.as_str());
        if let Some(parsed) = date_str.and_then(parse_flexible) {
            return Some(parsed);
        }
    }
    None
}

fn from_meta_tags(document: &Html) -> Option<NaiveDateTime> {
    for (attr, value) in META_TARGETS {
        let Ok(selector) = Selector::parse(&format!(r#"meta[{attr}="{value}"]"#)) else {
            continue;
        };
        let parsed = document
            .select(&selector)
            .filter_map(|tag| tag.value().attr("content"))
            .find_map(parse_flexible);
        if parsed.is_some() {
            return parsed;
        }
    }
    None
}

/// Look for a `/YYYY/MM/DD/` run of path segments, e.g.
/// `https://blog.example.com/2023/10/25/post-title`. Invalid calendar
/// dates are rejected silently.
fn from_url_path(url: &str) -> Option<NaiveDateTime> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();

    for win in segments.windows(3) {
        let [y, m, d] = win else { continue };
        if y.len() != 4 || m.len() != 2 || d.len() != 2 {
            continue;
        }
        let (Ok(y), Ok(m), Ok(d)) = (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn from_time_element(document: &Html) -> Option<NaiveDateTime> {
    document
        .select(&TIME_SEL)
        .filter_map(|el| el.value().attr("datetime"))
        .find_map(parse_flexible)
}

/// Absolute formats tried after RFC 3339 / RFC 2822.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Tolerant date-string parsing. Timezone-aware values are normalized to
/// naive UTC; date-only values get a midnight time.
pub fn parse_flexible(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Whether a result's inferred date falls inside the filter window.
/// An unknown date is never excluded.
pub fn is_date_relevant(date: Option<NaiveDateTime>, filter: TimeFilter) -> bool {
    is_date_relevant_at(date, filter, Local::now().naive_local())
}

pub fn is_date_relevant_at(
    date: Option<NaiveDateTime>,
    filter: TimeFilter,
    now: NaiveDateTime,
) -> bool {
    match date {
        None => true,
        Some(date) => now - date <= filter.window(),
    }
}
