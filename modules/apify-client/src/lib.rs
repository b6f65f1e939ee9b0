pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{ApolloScraperInput, RunData};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for the Apollo people-search scraper.
pub const APOLLO_SCRAPER: &str = "jljBwyyQakqrL1wae";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    actor_id: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            actor_id: APOLLO_SCRAPER.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Use a different Apollo scraper actor.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let resp = check_status(resp).await?;
            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed {
                        run_id: run_id.to_string(),
                        status: api_resp.data.status,
                    });
                }
                _ => {
                    tracing::debug!(
                        run_id,
                        status = %api_resp.data.status,
                        "Run still in progress"
                    );
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run, at most `limit` when given.
    pub async fn get_dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<T>> {
        let mut url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Scrape Apollo prospects end-to-end: start run, poll, fetch results.
    ///
    /// Items are returned as raw JSON objects; their shape varies between
    /// records and is normalized downstream.
    pub async fn scrape_apollo_prospects(
        &self,
        search_url: &str,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>> {
        tracing::info!(limit, actor = %self.actor_id, "Starting Apollo prospect scrape");

        let input = ApolloScraperInput::new(search_url, limit);
        let run = self.start_run(&self.actor_id, &input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            duration_secs = ?completed.duration_secs(),
            "Run completed, fetching results"
        );

        let mut items: Vec<serde_json::Value> = self
            .get_dataset_items(&completed.default_dataset_id, Some(limit))
            .await?;
        items.truncate(limit as usize);
        tracing::info!(count = items.len(), "Fetched Apollo prospects");

        Ok(items)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApifyError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
