// Test mocks for the lead search pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockCompleter (TextCompleter): canned reply or failure, records prompts
// - MockScraper (ProspectScraper): canned records, failure or delay
// - MockLeadStore (LeadStore): in-memory owner → emails map, with deletes
//
// Plus fixtures for criteria and leads.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use leadgen_common::{CanonicalLead, ConfidenceLevel, LeadFilters, SearchCriteria};
use leadgen_store::{LeadStats, UpsertSummary};

use crate::query::{GeneratedQuery, QueryMode, QuerySource, BASE_SEARCH_URL};
use crate::traits::{LeadStore, ProspectScraper, TextCompleter};

// ---------------------------------------------------------------------------
// MockCompleter
// ---------------------------------------------------------------------------

pub struct MockCompleter {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompleter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompleter for MockCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(error) => bail!("MockCompleter: {error}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

pub struct MockScraper {
    records: Vec<Value>,
    error: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl MockScraper {
    pub fn returning(records: Vec<Value>) -> Self {
        Self {
            records,
            error: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::returning(Vec::new())
        }
    }

    /// Sleep before answering; pairs with a short scrape timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// (query, target_count) for every run, in call order.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProspectScraper for MockScraper {
    async fn run(&self, query: &str, target_count: u32) -> Result<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), target_count));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.error {
            bail!("MockScraper: {error}");
        }
        Ok(self.records.clone())
    }
}

// ---------------------------------------------------------------------------
// MockLeadStore
// ---------------------------------------------------------------------------

/// In-memory store keyed by owner. Upserts add their emails to the owner's set.
pub struct MockLeadStore {
    emails: Mutex<HashMap<String, HashSet<String>>>,
    saved: Mutex<Vec<(String, CanonicalLead)>>,
    lookups: Mutex<usize>,
    fail_lookups: bool,
    fail_upserts: bool,
    fail_deletes: bool,
}

impl Default for MockLeadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLeadStore {
    pub fn new() -> Self {
        Self {
            emails: Mutex::new(HashMap::new()),
            saved: Mutex::new(Vec::new()),
            lookups: Mutex::new(0),
            fail_lookups: false,
            fail_upserts: false,
            fail_deletes: false,
        }
    }

    pub fn with_existing(self, owner: &str, emails: &[&str]) -> Self {
        self.emails
            .lock()
            .unwrap()
            .entry(owner.to_string())
            .or_default()
            .extend(emails.iter().map(|e| e.to_string()));
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn failing_upserts(mut self) -> Self {
        self.fail_upserts = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn lookup_count(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    /// Leads saved for `owner`, in save order.
    pub fn saved_for(&self, owner: &str) -> Vec<CanonicalLead> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, lead)| lead.clone())
            .collect()
    }
}

#[async_trait]
impl LeadStore for MockLeadStore {
    async fn find_existing_contacts(
        &self,
        owner: &str,
        contact_ids: &HashSet<String>,
    ) -> Result<HashSet<String>> {
        *self.lookups.lock().unwrap() += 1;
        if self.fail_lookups {
            bail!("MockLeadStore: lookup unavailable");
        }
        let emails = self.emails.lock().unwrap();
        Ok(emails
            .get(owner)
            .map(|known| known.intersection(contact_ids).cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, leads: &[CanonicalLead], owner: &str) -> Result<UpsertSummary> {
        if self.fail_upserts {
            bail!("MockLeadStore: upsert unavailable");
        }
        let mut emails = self.emails.lock().unwrap();
        let mut saved = self.saved.lock().unwrap();
        for lead in leads {
            if let Some(email) = &lead.email {
                emails.entry(owner.to_string()).or_default().insert(email.clone());
            }
            saved.push((owner.to_string(), lead.clone()));
        }
        Ok(UpsertSummary {
            inserted_count: leads.len(),
            ids: leads.iter().map(|l| l.id.clone()).collect(),
        })
    }

    async fn stats(&self, owner: &str) -> Result<LeadStats> {
        let leads = self.saved_for(owner);
        Ok(LeadStats {
            total_leads: leads.len() as i64,
            with_email: leads.iter().filter(|l| l.email.is_some()).count() as i64,
        })
    }

    async fn delete(&self, ids: &[String], owner: &str) -> Result<Vec<String>> {
        if self.fail_deletes {
            bail!("MockLeadStore: delete unavailable");
        }
        let mut saved = self.saved.lock().unwrap();
        let mut emails = self.emails.lock().unwrap();
        let mut deleted = Vec::new();
        saved.retain(|(o, lead)| {
            let doomed = o == owner && ids.contains(&lead.id);
            if doomed {
                if let (Some(email), Some(known)) = (&lead.email, emails.get_mut(owner)) {
                    known.remove(email);
                }
                deleted.push(lead.id.clone());
            }
            !doomed
        });
        Ok(deleted)
    }

    async fn is_healthy(&self) -> bool {
        !self.fail_lookups
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn free_text_criteria(text: &str) -> SearchCriteria {
    SearchCriteria::new(Some(text.to_string()), LeadFilters::default(), 50).unwrap()
}

pub fn filter_criteria(filters: LeadFilters) -> SearchCriteria {
    SearchCriteria::new(None, filters, 50).unwrap()
}

/// A named lead whose only possible contact channel is `email`.
pub fn lead(id: &str, email: Option<&str>) -> CanonicalLead {
    CanonicalLead {
        id: id.to_string(),
        first_name: Some("Mei".to_string()),
        last_name: Some("Lin".to_string()),
        full_name: Some("Mei Lin".to_string()),
        email: email.map(String::from),
        phone: None,
        linkedin_url: None,
        job_title: Some("Founder".to_string()),
        company_name: Some("Glow Labs".to_string()),
        company_size: None,
        industry: Vec::new(),
        location: Some("Taipei, Taiwan".to_string()),
        keywords: Vec::new(),
        confidence_score: 0.8,
        confidence_level: if email.is_some() {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Medium
        },
        source_criteria: free_text_criteria("skincare founders in Taipei"),
    }
}

pub fn rule_query() -> GeneratedQuery {
    GeneratedQuery {
        query_string: BASE_SEARCH_URL.to_string(),
        mode: QueryMode::FreeTextParsed,
        source: QuerySource::RuleBased,
        oracle_calls: 0,
    }
}
