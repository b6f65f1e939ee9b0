//! LeadSearch: one request end to end: query, scrape, normalize, dedup.
//!
//! Only invalid criteria fail the request. Every other failure degrades to
//! fewer (or zero) leads so callers always get a well-formed outcome.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use leadgen_common::{
    BatchMetrics, CanonicalLead, Config, LeadgenError, SearchCriteria, SearchRequest,
};

use crate::batch::{process_batch, RecordFailure};
use crate::dedup::filter_new;
use crate::query::{GeneratedQuery, QueryBuilder};
use crate::traits::{LeadStore, ProspectScraper};

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    /// Upper bound on records requested from the scraper per search.
    pub max_leads_per_request: u32,
    pub scrape_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_leads_per_request: 50,
            scrape_timeout: Duration::from_secs(300),
        }
    }
}

impl From<&Config> for SearchSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_leads_per_request: config.max_leads_per_request,
            scrape_timeout: config.request_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub request_id: Uuid,
    /// New leads for the owner, after deduplication.
    pub leads: Vec<CanonicalLead>,
    /// Computed over the normalized batch, before deduplication.
    pub metrics: BatchMetrics,
    pub query: GeneratedQuery,
    pub failures: Vec<RecordFailure>,
    pub duplicates_filtered: usize,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn enriched_count(&self) -> usize {
        self.leads.iter().filter(|l| l.is_enriched()).count()
    }

    pub fn message(&self) -> String {
        if self.is_empty() {
            return "Search completed but no leads found matching your criteria. \
                    Try adjusting your search parameters."
                .to_string();
        }

        let mut message = format!(
            "Search completed successfully. Found {} leads matching your criteria.",
            self.leads.len()
        );
        let enriched = self.enriched_count();
        if enriched > 0 {
            message.push_str(&format!(" {enriched} leads were enriched with additional data."));
        }
        message
    }
}

pub struct LeadSearch {
    query_builder: QueryBuilder,
    scraper: Arc<dyn ProspectScraper>,
    store: Arc<dyn LeadStore>,
    settings: SearchSettings,
}

impl LeadSearch {
    pub fn new(
        query_builder: QueryBuilder,
        scraper: Arc<dyn ProspectScraper>,
        store: Arc<dyn LeadStore>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            query_builder,
            scraper,
            store,
            settings,
        }
    }

    pub fn has_oracle(&self) -> bool {
        self.query_builder.has_oracle()
    }

    /// Validate the request, then run it. Nothing external is called for invalid criteria.
    pub async fn search(
        &self,
        request: SearchRequest,
        owner: &str,
    ) -> Result<SearchOutcome, LeadgenError> {
        let criteria = SearchCriteria::from_request(request)?;
        Ok(self.run(criteria, owner).await)
    }

    pub async fn run(&self, criteria: SearchCriteria, owner: &str) -> SearchOutcome {
        let request_id = Uuid::new_v4();
        info!(%request_id, owner, max_results = criteria.max_results(), "Starting lead search");

        let query = self.query_builder.build_query(&criteria).await;

        let target = criteria.max_results().min(self.settings.max_leads_per_request);
        let raw = self.fetch_raw(&query.query_string, target).await;

        let mut batch = process_batch(&raw, &criteria, owner);
        batch.metrics.ai_queries_used = query.oracle_calls;

        let normalized = batch.leads.len();
        let leads = filter_new(batch.leads, owner, self.store.as_ref()).await;
        let duplicates_filtered = normalized - leads.len();

        info!(
            %request_id,
            raw = raw.len(),
            normalized,
            duplicates_filtered,
            returned = leads.len(),
            "Lead search completed"
        );

        SearchOutcome {
            request_id,
            leads,
            metrics: batch.metrics,
            query,
            failures: batch.failures,
            duplicates_filtered,
        }
    }

    /// Scraper failures and timeouts degrade to an empty batch.
    async fn fetch_raw(&self, query: &str, target: u32) -> Vec<Value> {
        let scrape = self.scraper.run(query, target);
        match tokio::time::timeout(self.settings.scrape_timeout, scrape).await {
            Ok(Ok(mut records)) => {
                records.truncate(target as usize);
                info!(count = records.len(), target, "Scraper returned records");
                records
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Scrape failed, continuing with no records");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.settings.scrape_timeout.as_secs(),
                    "Scrape timed out, continuing with no records"
                );
                Vec::new()
            }
        }
    }
}
