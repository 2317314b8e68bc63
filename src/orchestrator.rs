use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::data_models::{
    DeepDiveOutcome, DeepDiveStatus, ProviderId, Query, SearchOutput, SearchResult, TimeFilter,
};
use crate::dates;
use crate::extractor;
use crate::headers::{jitter, random_headers};
use crate::providers::{DdgLiteProvider, GoogleCseProvider, SearchProvider};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Caller's provider choice: pin one backend, or let the orchestrator fail
/// over in its fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelector {
    DdgLite,
    GoogleCse,
    Auto,
}

/// Why a deep dive degraded. Fetch failures and extraction failures map to
/// different result statuses.
pub enum DeepDiveFailure {
    Fetch(String),
    Extract {
        published_at: Option<NaiveDateTime>,
        error: String,
    },
}

pub struct SearchOrchestrator {
    client: Client,
    config: Config,
    rng: StdRng,
    deep: bool,
}

impl SearchOrchestrator {
    pub fn new(config: Config, deep: bool) -> anyhow::Result<SearchOrchestrator> {
        // One client for the whole run: provider calls and deep dives share
        // its connection pool.
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(SearchOrchestrator {
            client,
            config,
            rng: StdRng::from_entropy(),
            deep,
        })
    }

    /// Run one search invocation end to end. Never fails: every failure
    /// path resolves to a structured output document.
    pub async fn run(&mut self, query: &Query, selector: ProviderSelector) -> SearchOutput {
        let candidates = match candidate_ids(&self.config, selector) {
            Ok(ids) => ids,
            Err(reason) => return SearchOutput::empty(&query.text, reason),
        };

        let mut committed: Option<(ProviderId, Vec<SearchResult>)> = None;
        for id in candidates {
            let provider = self.build_provider(id);
            match provider.search(&self.client, query, &mut self.rng).await {
                Ok(results) if !results.is_empty() => {
                    committed = Some((id, results));
                    break;
                }
                Ok(_) => {
                    tracing::warn!(provider = id.as_str(), "provider returned no results");
                }
                Err(e) => {
                    tracing::warn!(provider = id.as_str(), error = %e, "provider failed");
                }
            }
        }

        let Some((provider_id, results)) = committed else {
            return SearchOutput::empty(&query.text, "No results found or all providers failed.");
        };

        let mut processed = Vec::with_capacity(results.len());
        for mut result in results {
            if self.deep {
                let outcome = self.deep_dive(&result.url).await;
                fold_outcome(&mut result, outcome);
            }
            processed.push(result);
        }

        let final_results = apply_time_filter(processed, query.time_filter);
        SearchOutput {
            query: query.text.clone(),
            count: final_results.len(),
            provider: provider_id.as_str().to_string(),
            results: final_results,
            error: None,
        }
    }

    fn build_provider(&self, id: ProviderId) -> SearchProvider {
        match id {
            ProviderId::DdgLite => SearchProvider::DdgLite(DdgLiteProvider),
            ProviderId::GoogleCse => SearchProvider::GoogleCse(GoogleCseProvider::new(
                self.config.google_api_key.clone(),
                self.config.google_cx.clone(),
            )),
        }
    }

    /// Fetch one result URL and extract its readable content and
    /// publication date. Failures degrade this result only.
    async fn deep_dive(&mut self, url: &str) -> Result<DeepDiveOutcome, DeepDiveFailure> {
        let delay = jitter(&mut self.rng, 1_500, 3_500);
        let headers = random_headers(&mut self.rng);
        tokio::time::sleep(delay).await;

        tracing::info!("deep diving into: {url}");
        let body = fetch_page(&self.client, url, headers)
            .await
            .map_err(DeepDiveFailure::Fetch)?;

        // Date inference runs even when readability fails, so a degraded
        // result keeps whatever partial data exists.
        let published_at = dates::infer_published_at(&body, url);

        match extractor::extract_readable(&body, url) {
            Ok(extracted) => Ok(DeepDiveOutcome {
                content: extracted.content_text,
                title: extracted.title,
                published_at,
            }),
            Err(e) => Err(DeepDiveFailure::Extract {
                published_at,
                error: e.to_string(),
            }),
        }
    }
}

async fn fetch_page(
    client: &Client,
    url: &str,
    headers: reqwest::header::HeaderMap,
) -> Result<String, String> {
    let resp = client
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let resp = resp.error_for_status().map_err(|e| e.to_string())?;
    resp.text().await.map_err(|e| e.to_string())
}

/// Candidate ordering. Pinned selectors resolve to exactly one provider;
/// auto tries the no-credential scraper first, then the credentialed API
/// if fully configured.
pub fn candidate_ids(
    config: &Config,
    selector: ProviderSelector,
) -> Result<Vec<ProviderId>, String> {
    match selector {
        ProviderSelector::DdgLite => Ok(vec![ProviderId::DdgLite]),
        ProviderSelector::GoogleCse => {
            if config.google_configured() {
                Ok(vec![ProviderId::GoogleCse])
            } else {
                Err(
                    "Google provider requested but GOOGLE_API_KEY / GOOGLE_CX are not configured."
                        .to_string(),
                )
            }
        }
        ProviderSelector::Auto => {
            let mut ids = vec![ProviderId::DdgLite];
            if config.google_configured() {
                ids.push(ProviderId::GoogleCse);
            }
            Ok(ids)
        }
    }
}

/// Fold a deep-dive outcome into its result. One bad URL degrades that
/// result alone; the result is always retained.
pub fn fold_outcome(result: &mut SearchResult, outcome: Result<DeepDiveOutcome, DeepDiveFailure>) {
    match outcome {
        Ok(outcome) => {
            result.deep_dive_status = DeepDiveStatus::Success;
            result.deep_content = Some(outcome.content);
            result.extracted_date = outcome.published_at;
            // Some API results carry an empty title; the extracted one is
            // better than nothing.
            if result.title.is_empty() {
                if let Some(title) = outcome.title {
                    result.title = title;
                }
            }
        }
        Err(DeepDiveFailure::Fetch(e)) => {
            result.deep_dive_status = DeepDiveStatus::Error;
            result.error = Some(e);
        }
        Err(DeepDiveFailure::Extract {
            published_at,
            error,
        }) => {
            result.deep_dive_status = DeepDiveStatus::Failed;
            result.extracted_date = published_at;
            result.error = Some(error);
        }
    }
}

/// Mark and drop results whose inferred date falls outside the filter
/// window. A result with no inferred date is never excluded.
pub fn apply_time_filter(
    results: Vec<SearchResult>,
    filter: Option<TimeFilter>,
) -> Vec<SearchResult> {
    let Some(filter) = filter else {
        return results;
    };
    results
        .into_iter()
        .filter_map(|mut result| match result.extracted_date {
            Some(date) if !dates::is_date_relevant(Some(date), filter) => {
                result.filtered_out = true;
                result.filter_reason =
                    Some(format!("date {date} outside range {}", filter.ddg_code()));
                tracing::info!(url = %result.url, date = %date, "filtered out by time window");
                None
            }
            _ => Some(result),
        })
        .collect()
}
