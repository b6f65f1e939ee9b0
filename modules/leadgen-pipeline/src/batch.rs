//! Batch Processor: normalizes every raw record independently.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use leadgen_common::{BatchMetrics, CanonicalLead, ConfidenceDistribution, SearchCriteria};

use crate::normalizer::normalize;

/// A raw record that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Position in the raw batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub leads: Vec<CanonicalLead>,
    pub failures: Vec<RecordFailure>,
    pub metrics: BatchMetrics,
}

pub fn process_batch(
    raw_records: &[Value],
    criteria: &SearchCriteria,
    owner: &str,
) -> BatchOutcome {
    let started = Instant::now();
    let mut leads = Vec::with_capacity(raw_records.len());
    let mut failures = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, raw) in raw_records.iter().enumerate() {
        match normalize(raw, criteria) {
            Ok(mut lead) => {
                // Upstream ids are not guaranteed unique within a batch.
                if !seen_ids.insert(lead.id.clone()) {
                    lead.id = Uuid::new_v4().to_string();
                    seen_ids.insert(lead.id.clone());
                }
                leads.push(lead);
            }
            Err(e) => {
                warn!(index, error = %e, "Skipping raw record");
                failures.push(RecordFailure {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    let metrics = compute_metrics(&leads, started.elapsed(), failures.len(), raw_records.len());
    log_metrics(&metrics, owner);

    BatchOutcome {
        leads,
        failures,
        metrics,
    }
}

/// Metrics over the successfully normalized leads.
pub fn compute_metrics(
    leads: &[CanonicalLead],
    elapsed: Duration,
    error_count: usize,
    raw_count: usize,
) -> BatchMetrics {
    let mut distribution = ConfidenceDistribution::default();
    for lead in leads {
        distribution.record(lead.confidence_level);
    }

    BatchMetrics {
        total_found: leads.len(),
        total_enriched: leads.iter().filter(|l| l.is_enriched()).count(),
        processing_time_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        confidence_distribution: distribution,
        error_count,
        raw_count,
        ai_queries_used: 0,
    }
}

fn log_metrics(metrics: &BatchMetrics, owner: &str) {
    let success_rate = if metrics.raw_count == 0 {
        0.0
    } else {
        metrics.total_found as f64 / metrics.raw_count as f64 * 100.0
    };

    info!(
        operation = "lead_normalization",
        owner,
        raw_count = metrics.raw_count,
        success_count = metrics.total_found,
        error_count = metrics.error_count,
        enriched = metrics.total_enriched,
        success_rate = %format!("{success_rate:.1}%"),
        duration_secs = metrics.processing_time_seconds,
        "Processing metrics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use serde_json::json;

    fn criteria() -> SearchCriteria {
        free_text_criteria("skincare founders in Taipei")
    }

    #[test]
    fn bad_records_land_in_failure_channel() {
        let raw = vec![
            json!({"id": "a", "email": "a@glow.tw"}),
            json!(["not", "a", "record"]),
            json!({"id": "b"}),
        ];

        let outcome = process_batch(&raw, &criteria(), "owner-1");

        assert_eq!(outcome.leads.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.metrics.error_count, 1);
        assert_eq!(outcome.metrics.raw_count, 3);
        assert_eq!(outcome.metrics.total_found, 2);
    }

    #[test]
    fn mixed_field_shapes_still_normalize() {
        let raw = vec![
            json!({"email": "a@glow.tw", "industry": ["cosmetics", "retail"]}),
            json!({"organizationKeywords": "growth, beauty", "confidenceScore": "0.9"}),
        ];

        let outcome = process_batch(&raw, &criteria(), "owner-1");

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.leads.len(), 2);
        assert_eq!(outcome.leads[0].industry, vec!["cosmetics", "retail"]);
        assert_eq!(outcome.leads[1].keywords, vec!["growth", "beauty"]);
    }

    #[test]
    fn colliding_upstream_ids_are_reminted() {
        let raw = vec![json!({"id": "dup"}), json!({"id": "dup"}), json!({"id": "dup"})];

        let outcome = process_batch(&raw, &criteria(), "owner-1");

        let ids: HashSet<_> = outcome.leads.iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(outcome.leads[0].id, "dup");
    }

    #[test]
    fn empty_batch_has_zeroed_metrics() {
        let outcome = process_batch(&[], &criteria(), "owner-1");
        assert!(outcome.leads.is_empty());
        assert_eq!(outcome.metrics.total_found, 0);
        assert_eq!(outcome.metrics.confidence_distribution, ConfidenceDistribution::default());
    }

    #[test]
    fn elapsed_time_rounded_to_hundredths() {
        let metrics = compute_metrics(&[], Duration::from_millis(1234), 0, 0);
        assert_eq!(metrics.processing_time_seconds, 1.23);
    }
}
