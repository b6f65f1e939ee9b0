use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for the Apollo prospect scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct ApolloScraperInput {
    /// Apollo people-search URL to crawl.
    pub url: String,
    #[serde(rename = "totalRecords")]
    pub total_records: u32,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

impl ApolloScraperInput {
    /// The actor rejects runs smaller than this.
    pub const MIN_TOTAL_RECORDS: u32 = 500;

    pub fn new(url: impl Into<String>, total_records: u32) -> Self {
        Self {
            url: url.into(),
            total_records: total_records.max(Self::MIN_TOTAL_RECORDS),
            file_name: "Apollo Prospects".to_string(),
        }
    }
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    /// Wall-clock run duration, when both timestamps are known.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}
