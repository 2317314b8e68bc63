use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

/// Real browser user-agent strings, rotated per request to blunt trivial
/// bot fingerprinting.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_3_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36 Edg/122.0.0.0",
];

/// Build a plausible browser header set with a randomly chosen user agent.
/// Pure over the injected rng, so a seeded rng gives deterministic headers.
pub fn random_headers(rng: &mut impl Rng) -> HeaderMap {
    let ua = USER_AGENTS
        .choose(rng)
        .copied()
        .unwrap_or(USER_AGENTS[0]);

    let mut headers = HeaderMap::new();
    headers.insert("User-Agent", HeaderValue::from_static(ua));
    headers.insert(
        "Accept",
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("Referer", HeaderValue::from_static("https://www.google.com/"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("cross-site"));
    headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));
    headers
}

/// Polite pre-request delay drawn uniformly from `[lo_ms, hi_ms)`.
pub fn jitter(rng: &mut impl Rng, lo_ms: u64, hi_ms: u64) -> Duration {
    Duration::from_millis(rng.gen_range(lo_ms..hi_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeded_rng_gives_deterministic_headers() {
        let a = random_headers(&mut StdRng::seed_from_u64(7));
        let b = random_headers(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.get("User-Agent"), b.get("User-Agent"));
    }

    #[test]
    fn headers_look_like_a_browser() {
        let h = random_headers(&mut StdRng::seed_from_u64(1));
        let ua = h.get("User-Agent").unwrap().to_str().unwrap();
        assert!(ua.starts_with("Mozilla/5.0"));
        assert!(h.contains_key("Accept-Language"));
        assert!(h.contains_key("Sec-Fetch-Mode"));
    }

    #[test]
    fn jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let d = jitter(&mut rng, 1_000, 3_000);
            assert!(d >= Duration::from_millis(1_000));
            assert!(d < Duration::from_millis(3_000));
        }
    }
}
