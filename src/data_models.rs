use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Which backend produced a result.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    DdgLite,
    GoogleCse,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DdgLite => "ddg_lite",
            ProviderId::GoogleCse => "google_cse",
        }
    }
}

/// Coarse recency bucket. Used both as a provider query hint and as a
/// post-fetch filter against an inferred publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    Day,
    Week,
    Month,
    Year,
}

impl TimeFilter {
    pub fn from_code(code: &str) -> Option<TimeFilter> {
        match code {
            "d" => Some(TimeFilter::Day),
            "w" => Some(TimeFilter::Week),
            "m" => Some(TimeFilter::Month),
            "y" => Some(TimeFilter::Year),
            _ => None,
        }
    }

    /// Single-letter `df` form-field code used by DDG Lite.
    pub fn ddg_code(&self) -> &'static str {
        match self {
            TimeFilter::Day => "d",
            TimeFilter::Week => "w",
            TimeFilter::Month => "m",
            TimeFilter::Year => "y",
        }
    }

    /// Google Custom Search `dateRestrict` syntax.
    pub fn google_restrict(&self) -> &'static str {
        match self {
            TimeFilter::Day => "d1",
            TimeFilter::Week => "w1",
            TimeFilter::Month => "m1",
            TimeFilter::Year => "y1",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            TimeFilter::Day => Duration::hours(24),
            TimeFilter::Week => Duration::days(7),
            TimeFilter::Month => Duration::days(30),
            TimeFilter::Year => Duration::days(365),
        }
    }
}

/// One search invocation's parameters. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub count: usize,
    pub time_filter: Option<TimeFilter>,
}

impl Query {
    pub fn new(text: String, count: usize, time_filter: Option<TimeFilter>) -> Query {
        Query {
            text,
            count: count.max(1),
            time_filter,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeepDiveStatus {
    Skipped,
    Success,
    Failed,
    Error,
}

/// A normalized search result. Providers fill the first four fields; the
/// deep-dive pass mutates the rest.
#[derive(Serialize, Debug, Clone)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: ProviderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_date: Option<NaiveDateTime>,
    pub deep_dive_status: DeepDiveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub filtered_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_reason: Option<String>,
}

impl SearchResult {
    pub fn new(title: String, url: String, snippet: String, source: ProviderId) -> SearchResult {
        SearchResult {
            title,
            url,
            snippet,
            source,
            deep_content: None,
            extracted_date: None,
            deep_dive_status: DeepDiveStatus::Skipped,
            error: None,
            filtered_out: false,
            filter_reason: None,
        }
    }
}

/// Product of one deep dive, folded into the owning result.
#[derive(Debug, Clone)]
pub struct DeepDiveOutcome {
    pub content: String,
    pub title: Option<String>,
    pub published_at: Option<NaiveDateTime>,
}

/// The single structured document printed to stdout. Always valid JSON,
/// even on total failure.
#[derive(Serialize, Debug, Clone)]
pub struct SearchOutput {
    pub query: String,
    pub count: usize,
    pub provider: String,
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutput {
    pub fn empty(query: &str, reason: impl Into<String>) -> SearchOutput {
        SearchOutput {
            query: query.to_string(),
            count: 0,
            provider: "none".to_string(),
            results: Vec::new(),
            error: Some(reason.into()),
        }
    }
}
