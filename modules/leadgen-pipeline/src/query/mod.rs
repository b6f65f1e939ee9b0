//! Query Builder: turns validated criteria into an Apollo people-search URL.
//!
//! Strategies are tried in order of preference. Each either resolves a query
//! or declines with a reason; the rule-based assembly is always the last
//! resort, so `build_query` never fails.

mod oracle;
mod prompt;
mod rules;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use leadgen_common::SearchCriteria;

use crate::traits::TextCompleter;

pub use oracle::OracleStrategy;
pub use prompt::build_prompt;
pub use rules::{assemble_query, RuleBasedStrategy};

/// Every accepted query must live under this prefix.
pub const VENDOR_URL_PREFIX: &str = "https://app.apollo.io";
/// People search restricted to verified contacts. Fallback queries start here.
pub const BASE_SEARCH_URL: &str =
    "https://app.apollo.io/#/people?page=1&contactEmailStatusV2[]=verified";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Only free text: the oracle must extract filters itself.
    FreeTextParsed,
    /// Structured filters present: the oracle must use exactly those values.
    StructuredDirect,
}

impl QueryMode {
    pub fn select(criteria: &SearchCriteria) -> Self {
        if criteria.has_filters() {
            QueryMode::StructuredDirect
        } else {
            QueryMode::FreeTextParsed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySource {
    Oracle,
    RuleBased,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuery {
    pub query_string: String,
    pub mode: QueryMode,
    pub source: QuerySource,
    /// Oracle invocations made while resolving this query.
    #[serde(skip)]
    pub oracle_calls: u32,
}

/// Result of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Resolved(String),
    TryNext(String),
}

#[async_trait]
pub trait QueryStrategy: Send + Sync {
    fn source(&self) -> QuerySource;

    async fn attempt(&self, criteria: &SearchCriteria, mode: QueryMode) -> Attempt;
}

// ---------------------------------------------------------------------------
// QueryBuilder
// ---------------------------------------------------------------------------

pub struct QueryBuilder {
    strategies: Vec<Arc<dyn QueryStrategy>>,
}

impl QueryBuilder {
    /// Oracle first when one is configured, rules otherwise.
    pub fn new(oracle: Option<Arc<dyn TextCompleter>>) -> Self {
        let mut strategies: Vec<Arc<dyn QueryStrategy>> = Vec::new();
        if let Some(completer) = oracle {
            strategies.push(Arc::new(OracleStrategy::new(completer)));
        }
        strategies.push(Arc::new(RuleBasedStrategy));
        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Arc<dyn QueryStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn has_oracle(&self) -> bool {
        self.strategies
            .iter()
            .any(|s| s.source() == QuerySource::Oracle)
    }

    pub async fn build_query(&self, criteria: &SearchCriteria) -> GeneratedQuery {
        let mode = QueryMode::select(criteria);
        let mut oracle_calls = 0;

        for strategy in &self.strategies {
            let source = strategy.source();
            if source == QuerySource::Oracle {
                oracle_calls += 1;
            }

            match strategy.attempt(criteria, mode).await {
                Attempt::Resolved(query) if query.starts_with(VENDOR_URL_PREFIX) => {
                    info!(?source, ?mode, query = %query, "Search query resolved");
                    return GeneratedQuery {
                        query_string: query,
                        mode,
                        source,
                        oracle_calls,
                    };
                }
                Attempt::Resolved(query) => {
                    warn!(
                        ?source,
                        query = %query,
                        "Generated query outside vendor prefix, trying next strategy"
                    );
                }
                Attempt::TryNext(reason) => {
                    warn!(?source, reason = %reason, "Query strategy declined, trying next");
                }
            }
        }

        let query_string = assemble_query(criteria.filters());
        info!(?mode, query = %query_string, "Search query assembled from rules");
        GeneratedQuery {
            query_string,
            mode,
            source: QuerySource::RuleBased,
            oracle_calls,
        }
    }
}
