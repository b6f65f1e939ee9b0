// Trait abstractions for the lead search collaborators.
//
// TextCompleter wraps the LLM, ProspectScraper the Apify actor,
// LeadStore the Postgres lead table. Mocks live in `testing`.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use leadgen_common::CanonicalLead;
use leadgen_store::{LeadStats, PgLeadStore, UpsertSummary};

// ---------------------------------------------------------------------------
// TextCompleter (the query oracle)
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Single prompt in, raw model text out. The text is not trusted to be valid JSON.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextCompleter for ai_client::OpenAi {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.complete_json(prompt).await
    }
}

// ---------------------------------------------------------------------------
// ProspectScraper (the external record source)
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ProspectScraper: Send + Sync {
    /// Run one scrape for `query`, returning at most roughly `target_count` raw records.
    async fn run(&self, query: &str, target_count: u32) -> Result<Vec<Value>>;
}

#[async_trait]
impl ProspectScraper for apify_client::ApifyClient {
    async fn run(&self, query: &str, target_count: u32) -> Result<Vec<Value>> {
        Ok(self.scrape_apollo_prospects(query, target_count).await?)
    }
}

// ---------------------------------------------------------------------------
// LeadStore (persisted leads, partitioned by owner)
// ---------------------------------------------------------------------------

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Subset of `contact_ids` already stored for `owner`.
    async fn find_existing_contacts(
        &self,
        owner: &str,
        contact_ids: &HashSet<String>,
    ) -> Result<HashSet<String>>;

    async fn upsert(&self, leads: &[CanonicalLead], owner: &str) -> Result<UpsertSummary>;

    async fn stats(&self, owner: &str) -> Result<LeadStats>;

    /// Delete the owner's leads by id; returns the ids that existed.
    async fn delete(&self, ids: &[String], owner: &str) -> Result<Vec<String>>;

    async fn is_healthy(&self) -> bool;
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn find_existing_contacts(
        &self,
        owner: &str,
        contact_ids: &HashSet<String>,
    ) -> Result<HashSet<String>> {
        let emails: Vec<String> = contact_ids.iter().cloned().collect();
        let existing = self.existing_emails(owner, &emails).await?;
        Ok(existing.into_iter().collect())
    }

    async fn upsert(&self, leads: &[CanonicalLead], owner: &str) -> Result<UpsertSummary> {
        self.upsert_leads(owner, leads).await
    }

    async fn stats(&self, owner: &str) -> Result<LeadStats> {
        self.lead_stats(owner).await
    }

    async fn delete(&self, ids: &[String], owner: &str) -> Result<Vec<String>> {
        self.delete_leads(owner, ids).await
    }

    async fn is_healthy(&self) -> bool {
        self.ping().await
    }
}
