use chrono::NaiveDate;

use websift::config::Config;
use websift::data_models::{
    DeepDiveOutcome, DeepDiveStatus, ProviderId, SearchOutput, SearchResult, TimeFilter,
};
use websift::orchestrator::{
    DeepDiveFailure, ProviderSelector, apply_time_filter, candidate_ids, fold_outcome,
};

fn unconfigured() -> Config {
    Config::default()
}

fn with_google() -> Config {
    Config {
        google_api_key: Some("key".to_string()),
        google_cx: Some("cx".to_string()),
    }
}

fn result(url: &str) -> SearchResult {
    SearchResult::new(
        "title".to_string(),
        url.to_string(),
        "snippet".to_string(),
        ProviderId::DdgLite,
    )
}

mod provider_selection {
    use super::*;

    #[test]
    fn auto_without_credentials_is_ddg_only() {
        let ids = candidate_ids(&unconfigured(), ProviderSelector::Auto).unwrap();
        assert_eq!(ids, vec![ProviderId::DdgLite]);
    }

    #[test]
    fn auto_with_credentials_fails_over_to_google() {
        let ids = candidate_ids(&with_google(), ProviderSelector::Auto).unwrap();
        assert_eq!(ids, vec![ProviderId::DdgLite, ProviderId::GoogleCse]);
    }

    #[test]
    fn pinned_ddg_never_fails_over() {
        let ids = candidate_ids(&with_google(), ProviderSelector::DdgLite).unwrap();
        assert_eq!(ids, vec![ProviderId::DdgLite]);
    }

    #[test]
    fn pinned_google_with_credentials_is_google_only() {
        let ids = candidate_ids(&with_google(), ProviderSelector::GoogleCse).unwrap();
        assert_eq!(ids, vec![ProviderId::GoogleCse]);
    }

    #[test]
    fn pinned_google_without_credentials_is_an_error() {
        let err = candidate_ids(&unconfigured(), ProviderSelector::GoogleCse).unwrap_err();
        assert!(err.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn partial_google_pair_counts_as_unconfigured() {
        let config = Config {
            google_api_key: Some("key".to_string()),
            google_cx: None,
        };
        let ids = candidate_ids(&config, ProviderSelector::Auto).unwrap();
        assert_eq!(ids, vec![ProviderId::DdgLite]);
        assert!(candidate_ids(&config, ProviderSelector::GoogleCse).is_err());
    }
}

mod deep_dive_folding {
    use super::*;

    fn published() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn success_fills_content_and_date() {
        let mut r = result("https://example.com/a");
        fold_outcome(
            &mut r,
            Ok(DeepDiveOutcome {
                content: "article body".to_string(),
                title: Some("Article".to_string()),
                published_at: Some(published()),
            }),
        );
        assert_eq!(r.deep_dive_status, DeepDiveStatus::Success);
        assert_eq!(r.deep_content.as_deref(), Some("article body"));
        assert_eq!(r.extracted_date, Some(published()));
        assert!(r.error.is_none());
    }

    #[test]
    fn fetch_failure_is_an_error_status() {
        let mut r = result("https://example.com/a");
        fold_outcome(
            &mut r,
            Err(DeepDiveFailure::Fetch("connection refused".to_string())),
        );
        assert_eq!(r.deep_dive_status, DeepDiveStatus::Error);
        assert_eq!(r.error.as_deref(), Some("connection refused"));
        assert!(r.deep_content.is_none());
    }

    #[test]
    fn extract_failure_keeps_the_partial_date() {
        let mut r = result("https://example.com/a");
        fold_outcome(
            &mut r,
            Err(DeepDiveFailure::Extract {
                published_at: Some(published()),
                error: "no readable content".to_string(),
            }),
        );
        assert_eq!(r.deep_dive_status, DeepDiveStatus::Failed);
        assert_eq!(r.extracted_date, Some(published()));
        assert_eq!(r.error.as_deref(), Some("no readable content"));
        assert!(r.deep_content.is_none());
    }

    #[test]
    fn one_failed_dive_leaves_neighbors_untouched() {
        let mut results = vec![
            result("https://example.com/1"),
            result("https://example.com/2"),
            result("https://example.com/3"),
        ];
        let outcomes = [
            Ok(DeepDiveOutcome {
                content: "one".to_string(),
                title: None,
                published_at: None,
            }),
            Err(DeepDiveFailure::Fetch("timeout".to_string())),
            Ok(DeepDiveOutcome {
                content: "three".to_string(),
                title: None,
                published_at: None,
            }),
        ];
        for (r, o) in results.iter_mut().zip(outcomes) {
            fold_outcome(r, o);
        }
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].deep_dive_status, DeepDiveStatus::Success);
        assert_eq!(results[1].deep_dive_status, DeepDiveStatus::Error);
        assert_eq!(results[2].deep_dive_status, DeepDiveStatus::Success);
    }
}

mod time_filtering {
    use super::*;
    use chrono::{Duration, Local};

    fn dated(url: &str, ago: Duration) -> SearchResult {
        let mut r = result(url);
        r.extracted_date = Some(Local::now().naive_local() - ago);
        r
    }

    #[test]
    fn no_filter_leaves_results_untouched() {
        let results = vec![dated("https://a.example", Duration::days(500)), result("https://b.example")];
        let kept = apply_time_filter(results, None);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| !r.filtered_out));
    }

    #[test]
    fn stale_results_are_dropped_fresh_ones_kept_in_order() {
        let results = vec![
            dated("https://a.example", Duration::hours(2)),
            dated("https://b.example", Duration::days(90)),
            dated("https://c.example", Duration::days(3)),
        ];
        let kept = apply_time_filter(results, Some(TimeFilter::Week));
        let urls: Vec<&str> = kept.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://c.example"]);
    }

    #[test]
    fn undated_results_survive_any_filter() {
        let results = vec![result("https://a.example")];
        let kept = apply_time_filter(results, Some(TimeFilter::Day));
        assert_eq!(kept.len(), 1);
        assert!(!kept[0].filtered_out);
        assert!(kept[0].filter_reason.is_none());
    }
}

mod output_shape {
    use super::*;

    #[test]
    fn empty_output_carries_a_reason() {
        let out = SearchOutput::empty("rust async", "No results found or all providers failed.");
        assert_eq!(out.query, "rust async");
        assert_eq!(out.count, 0);
        assert_eq!(out.provider, "none");
        assert!(out.results.is_empty());
        assert!(out.error.is_some());
    }

    #[test]
    fn untouched_optional_fields_stay_out_of_the_json() {
        let out = SearchOutput {
            query: "q".to_string(),
            count: 1,
            provider: "ddg_lite".to_string(),
            results: vec![result("https://example.com/a")],
            error: None,
        };
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("error").is_none());
        let first = &json["results"][0];
        assert_eq!(first["deep_dive_status"], "skipped");
        assert_eq!(first["source"], "ddg_lite");
        assert_eq!(first["filtered_out"], false);
        assert!(first.get("deep_content").is_none());
        assert!(first.get("extracted_date").is_none());
        assert!(first.get("error").is_none());
        assert!(first.get("filter_reason").is_none());
    }

    #[test]
    fn deep_dive_statuses_serialize_as_snake_case() {
        let mut r = result("https://example.com/a");
        fold_outcome(&mut r, Err(DeepDiveFailure::Fetch("boom".to_string())));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["deep_dive_status"], "error");
        assert_eq!(json["error"], "boom");
    }
}
