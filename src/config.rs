use dotenvy::dotenv;
use std::env;

/// Credentials loaded once at startup and passed into the orchestrator.
/// Both Google values must be present together for the provider to be
/// usable; a partial pair counts as unconfigured.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub google_cx: Option<String>,
}

impl Config {
    pub fn from_env() -> Config {
        dotenv().ok(); // Load .env file if present
        Config {
            google_api_key: get_env_opt("GOOGLE_API_KEY"),
            google_cx: get_env_opt("GOOGLE_CX"),
        }
    }

    pub fn google_configured(&self) -> bool {
        self.google_api_key.is_some() && self.google_cx.is_some()
    }
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
