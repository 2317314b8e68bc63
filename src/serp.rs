use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// One `(title, url, snippet)` tuple lifted out of a results page, before
/// provider attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerpEntry {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

// DDG Lite lays results out as table rows: a title row holding
// `a.result-link`, usually followed by a `td.result-snippet` row. The
// html.duckduckgo.com variant nests `a.result__a` / `.result__snippet`
// inside one `.result` container. Both schemes are probed.
static LITE_LINK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result-link").expect("static selector"));
static LITE_SNIPPET_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.result-snippet").expect("static selector"));
static CONTAINER_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("static selector"));
static CONTAINER_LINK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("static selector"));
static CONTAINER_SNIPPET_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.result__snippet, td.result__snippet, div.result__snippet")
        .expect("static selector")
});

/// Challenge markers that mean the body is an anti-automation interstitial,
/// not a results page. The provider fails the whole search on any of these
/// rather than returning a partial, misleading result set.
const CHALLENGE_MARKERS: &[&str] = &[
    "anomaly-modal",
    "challenge-form",
    "g-recaptcha",
    "verify you are human",
];

pub fn detect_challenge(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    CHALLENGE_MARKERS
        .iter()
        .find(|marker| lower.contains(*marker))
        .copied()
}

/// Parse a search-results page into ordered entries.
///
/// Defensive by contract: malformed fragments are skipped, a missing
/// snippet yields an empty string, and a truncated document yields
/// whatever was collected so far. Never returns an error.
pub fn parse_results(html: &str, max_count: usize) -> Vec<SerpEntry> {
    let document = Html::parse_document(html);
    let mut out = Vec::new();

    // Lite scheme: titles and snippets align by index across rows. A
    // snippet row with no preceding title row can never emit an entry.
    let snippets: Vec<String> = document
        .select(&LITE_SNIPPET_SEL)
        .map(|el| clean_text(el))
        .collect();

    for (i, link) in document.select(&LITE_LINK_SEL).enumerate() {
        if out.len() >= max_count {
            return out;
        }
        let Some(entry) = entry_from_anchor(link, snippets.get(i).cloned()) else {
            continue;
        };
        out.push(entry);
    }
    if !out.is_empty() {
        return out;
    }

    // Container scheme fallback.
    for container in document.select(&CONTAINER_SEL) {
        if out.len() >= max_count {
            break;
        }
        let Some(anchor) = container.select(&CONTAINER_LINK_SEL).next() else {
            continue;
        };
        let snippet = container
            .select(&CONTAINER_SNIPPET_SEL)
            .next()
            .map(|el| clean_text(el));
        if let Some(entry) = entry_from_anchor(anchor, snippet) {
            out.push(entry);
        }
    }

    out
}

fn entry_from_anchor(anchor: ElementRef<'_>, snippet: Option<String>) -> Option<SerpEntry> {
    let title = clean_text(anchor);
    let href = anchor.value().attr("href")?.trim();
    if title.is_empty() || href.is_empty() {
        return None;
    }
    let url = normalize_href(href)?;
    Some(SerpEntry {
        title,
        url,
        snippet: snippet.unwrap_or_default(),
    })
}

/// Unwrap a redirector href into the real destination.
///
/// DDG wraps destinations like
/// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=…`; the `uddg`
/// query parameter carries the percent-encoded destination. Absent that,
/// the raw href is used, with a protocol-relative `//host/…` href promoted
/// to https. Anything still not absolute is dropped.
pub fn normalize_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with("/l/") {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    if let Ok(parsed) = Url::parse(&absolute) {
        if let Some((_, dest)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
            let dest = dest.trim();
            if dest.starts_with("http://") || dest.starts_with("https://") {
                return Some(dest.to_string());
            }
        }
    }

    if absolute.starts_with("http://") || absolute.starts_with("https://") {
        return Some(absolute);
    }
    None
}

/// Tag-stripped, entity-decoded, whitespace-collapsed element text.
/// scraper's text traversal already decodes entities and drops markup.
fn clean_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
