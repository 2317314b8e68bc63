use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::data_models::{ProviderId, Query, SearchResult};
use crate::headers::{jitter, random_headers};
use crate::serp;

const DDG_LITE_ENDPOINT: &str = "https://lite.duckduckgo.com/lite/";
const GOOGLE_CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Hard cap of the Google Custom Search API.
const GOOGLE_MAX_RESULTS: usize = 10;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("missing credentials for {0}")]
    MissingCredentials(&'static str),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bot challenge detected: {0}")]
    BotChallenge(&'static str),
    #[error("backend error: {0}")]
    Backend(String),
}

/// The closed set of search backends. The orchestrator dispatches over this
/// exhaustively; adding a backend is a compile-visible change.
pub enum SearchProvider {
    DdgLite(DdgLiteProvider),
    GoogleCse(GoogleCseProvider),
}

impl SearchProvider {
    pub fn id(&self) -> ProviderId {
        match self {
            SearchProvider::DdgLite(_) => ProviderId::DdgLite,
            SearchProvider::GoogleCse(_) => ProviderId::GoogleCse,
        }
    }

    pub async fn search(
        &self,
        client: &Client,
        query: &Query,
        rng: &mut (impl Rng + Send),
    ) -> Result<Vec<SearchResult>, ProviderError> {
        match self {
            SearchProvider::DdgLite(p) => p.search(client, query, rng).await,
            SearchProvider::GoogleCse(p) => p.search(client, query).await,
        }
    }
}

/// Scrapes the lightweight DDG Lite endpoint. No credentials, but easily
/// rate limited, so every call rotates headers and sleeps a polite jitter
/// first.
#[derive(Default)]
pub struct DdgLiteProvider;

impl DdgLiteProvider {
    pub async fn search(
        &self,
        client: &Client,
        query: &Query,
        rng: &mut (impl Rng + Send),
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let delay = jitter(rng, 1_000, 3_000);
        let headers = random_headers(rng);
        tokio::time::sleep(delay).await;

        let mut form = vec![("q", query.text.clone()), ("kl", "us-en".to_string())];
        if let Some(filter) = query.time_filter {
            form.push(("df", filter.ddg_code().to_string()));
        }

        tracing::info!(query = %query.text, "searching ddg lite");
        let resp = client
            .post(DDG_LITE_ENDPOINT)
            .headers(headers)
            .form(&form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        // Challenge pages can come back with a 200, so check the body
        // before the status.
        if let Some(marker) = serp::detect_challenge(&body) {
            return Err(ProviderError::BotChallenge(marker));
        }
        if !status.is_success() {
            return Err(ProviderError::Backend(format!("ddg lite HTTP {status}")));
        }

        let results = serp::parse_results(&body, query.count)
            .into_iter()
            .map(|e| SearchResult::new(e.title, e.url, e.snippet, ProviderId::DdgLite))
            .collect();
        Ok(results)
    }
}

/// Google Custom Search JSON API. Requires an API key and a search-engine
/// id; absence fails before any network call.
pub struct GoogleCseProvider {
    api_key: Option<String>,
    cx: Option<String>,
}

impl GoogleCseProvider {
    pub fn new(api_key: Option<String>, cx: Option<String>) -> GoogleCseProvider {
        GoogleCseProvider { api_key, cx }
    }

    pub async fn search(
        &self,
        client: &Client,
        query: &Query,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.cx.as_deref()) else {
            return Err(ProviderError::MissingCredentials("google_cse"));
        };

        let num = capped_count(query.count);
        let mut params = vec![
            ("q", query.text.clone()),
            ("key", key.to_string()),
            ("cx", cx.to_string()),
            ("num", num.to_string()),
        ];
        if let Some(filter) = query.time_filter {
            params.push(("dateRestrict", filter.google_restrict().to_string()));
        }

        tracing::info!(query = %query.text, num, "searching google cse");
        let resp = client
            .get(GOOGLE_CSE_ENDPOINT)
            .query(&params)
            .send()
            .await?;
        let status = resp.status();
        let payload: GoogleResponse = resp.json().await?;

        if let Some(err) = payload.error {
            return Err(ProviderError::Backend(format!(
                "google cse: {}",
                err.message
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::Backend(format!("google cse HTTP {status}")));
        }

        let results = payload
            .items
            .into_iter()
            .map(|item| {
                SearchResult::new(item.title, item.link, item.snippet, ProviderId::GoogleCse)
            })
            .collect();
        Ok(results)
    }
}

/// The API rejects `num` above 10 regardless of what the caller asked for.
fn capped_count(count: usize) -> usize {
    count.clamp(1, GOOGLE_MAX_RESULTS)
}

#[derive(Deserialize, Debug)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    error: Option<GoogleApiError>,
}

#[derive(Deserialize, Debug)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Deserialize, Debug)]
struct GoogleApiError {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_count_is_capped_at_ten() {
        assert_eq!(capped_count(50), 10);
        assert_eq!(capped_count(10), 10);
        assert_eq!(capped_count(3), 3);
        assert_eq!(capped_count(0), 1);
    }

    #[tokio::test]
    async fn google_without_credentials_fails_before_any_network_call() {
        let provider = GoogleCseProvider::new(None, None);
        let query = Query::new("test".into(), 5, None);
        // Client with no connectivity assumptions; the call must fail on
        // credentials alone.
        let client = Client::new();
        let err = provider.search(&client, &query).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials(_)));
    }

    #[test]
    fn google_items_deserialize_with_missing_fields() {
        let payload = r#"{"items": [{"title": "A", "link": "https://a.example"}]}"#;
        let parsed: GoogleResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].snippet, "");
    }
}
