use std::env;
use std::time::Duration;

use crate::error::{LeadgenError, Result};

pub const DEFAULT_APOLLO_ACTOR_ID: &str = "jljBwyyQakqrL1wae";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Auth
    pub jwt_secret: String,

    // Query generation
    pub openai_api_key: Option<String>,
    pub openai_model: String,

    // Scraping
    pub apify_api_token: String,
    pub apify_actor_id: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub allowed_origins: Vec<String>,

    // Processing
    pub max_leads_per_request: u32,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing;
    /// malformed numeric values are returned as `LeadgenError::Config`.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            database_url: required_env("DATABASE_URL"),
            jwt_secret: required_env("SUPABASE_JWT_SECRET"),
            openai_api_key,
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            apify_api_token: required_env("APIFY_API_TOKEN"),
            apify_actor_id: env::var("APIFY_ACTOR_ID")
                .unwrap_or_else(|_| DEFAULT_APOLLO_ACTOR_ID.to_string()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: parsed_env("WEB_PORT", 7860)?,
            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            max_leads_per_request: parsed_env("MAX_LEADS_PER_REQUEST", 50)?,
            request_timeout: Duration::from_secs(parsed_env("REQUEST_TIMEOUT_SECS", 300)?),
        })
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LeadgenError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_split_on_commas() {
        assert_eq!(
            parse_origins("https://prospec.io, http://localhost:5173,"),
            vec!["https://prospec.io", "http://localhost:5173"]
        );
        assert_eq!(parse_origins("*"), vec!["*"]);
    }

    #[test]
    fn unset_numeric_var_uses_default() {
        let port: u16 = parsed_env("LEADGEN_TEST_UNSET_PORT", 7860).unwrap();
        assert_eq!(port, 7860);
    }
}
