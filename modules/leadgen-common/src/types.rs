use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LeadgenError, Result};
use crate::safety::detect_abuse;

/// Hard upper bound on `max_results` for a single request.
pub const MAX_RESULTS_LIMIT: u32 = 500;
pub const DEFAULT_MAX_RESULTS: u32 = 50;
/// Minimum free-text length when it is the only criterion.
pub const MIN_FREE_TEXT_CHARS: usize = 10;
/// Confidence score used when the upstream record carries none.
pub const DEFAULT_CONFIDENCE_SCORE: f64 = 0.8;

// --- Search criteria ---

/// Structured search filters. Every field is optional; blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilters {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "company_size")]
    pub company_size_range: Option<String>,
    /// Comma-joined company names. Lists are joined on the way in.
    #[serde(default, deserialize_with = "comma_joined")]
    pub company_names: Option<String>,
    /// Comma-joined company keywords. Lists are joined on the way in.
    #[serde(default, alias = "general_keywords", deserialize_with = "comma_joined")]
    pub keywords: Option<String>,
}

impl LeadFilters {
    /// Trim every value and drop those left empty.
    fn normalized(self) -> Self {
        Self {
            job_title: clean(self.job_title),
            industry: clean(self.industry),
            location: clean(self.location),
            company_size_range: clean(self.company_size_range),
            company_names: clean(self.company_names),
            keywords: clean(self.keywords),
        }
    }

    /// True when no filter field carries a value.
    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }

    /// All non-empty filter values, in field order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [
            &self.job_title,
            &self.industry,
            &self.location,
            &self.company_size_range,
            &self.company_names,
            &self.keywords,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .filter(|v| !v.trim().is_empty())
    }

    pub fn job_titles(&self) -> Vec<&str> {
        split_list(self.job_title.as_deref())
    }

    pub fn industries(&self) -> Vec<&str> {
        split_list(self.industry.as_deref())
    }

    pub fn company_name_list(&self) -> Vec<&str> {
        split_list(self.company_names.as_deref())
    }

    pub fn keyword_list(&self) -> Vec<&str> {
        split_list(self.keywords.as_deref())
    }
}

/// Incoming search request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default, alias = "main_query")]
    pub free_text: Option<String>,
    #[serde(default)]
    pub filters: LeadFilters,
    #[serde(default)]
    pub max_results: Option<u32>,
}

/// Validated, immutable search criteria for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCriteria {
    free_text: Option<String>,
    filters: LeadFilters,
    max_results: u32,
}

impl SearchCriteria {
    /// Build criteria, rejecting requests that carry no usable search intent.
    pub fn new(free_text: Option<String>, filters: LeadFilters, max_results: u32) -> Result<Self> {
        let free_text = clean(free_text);
        let filters = filters.normalized();

        if free_text.is_none() && filters.is_empty() {
            return Err(LeadgenError::InvalidCriteria(
                "Either main query or at least one filter must be provided".to_string(),
            ));
        }

        if let Some(text) = &free_text {
            if filters.is_empty() && text.chars().count() < MIN_FREE_TEXT_CHARS {
                return Err(LeadgenError::InvalidCriteria(format!(
                    "Main query must be at least {MIN_FREE_TEXT_CHARS} characters when no filters are provided"
                )));
            }
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(LeadgenError::InvalidCriteria(format!(
                "max_results must be between 1 and {MAX_RESULTS_LIMIT}"
            )));
        }

        let findings: Vec<String> = free_text
            .iter()
            .map(String::as_str)
            .chain(filters.values())
            .flat_map(detect_abuse)
            .collect();
        if !findings.is_empty() {
            return Err(LeadgenError::InvalidCriteria(format!(
                "Query contains inappropriate content ({})",
                findings.join(", ")
            )));
        }

        Ok(Self {
            free_text,
            filters,
            max_results,
        })
    }

    pub fn from_request(request: SearchRequest) -> Result<Self> {
        Self::new(
            request.free_text,
            request.filters,
            request.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        )
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    pub fn filters(&self) -> &LeadFilters {
        &self.filters
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

// --- Canonical lead ---

/// Coarse quality bucket for display prioritization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized, schema-stable lead produced regardless of source record shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalLead {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Vec<String>,
    pub location: Option<String>,
    pub keywords: Vec<String>,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub source_criteria: SearchCriteria,
}

impl CanonicalLead {
    /// Number of populated contact channels among email, phone and LinkedIn.
    pub fn contact_methods(&self) -> usize {
        [&self.email, &self.phone, &self.linkedin_url]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }

    /// A lead is enriched when at least two contact channels are present.
    pub fn is_enriched(&self) -> bool {
        self.contact_methods() >= 2
    }
}

// --- Metrics ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceDistribution {
    pub fn record(&mut self, level: ConfidenceLevel) {
        match level {
            ConfidenceLevel::High => self.high += 1,
            ConfidenceLevel::Medium => self.medium += 1,
            ConfidenceLevel::Low => self.low += 1,
        }
    }
}

/// Per-run metrics computed over the successfully normalized leads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchMetrics {
    pub total_found: usize,
    pub total_enriched: usize,
    pub processing_time_seconds: f64,
    pub confidence_distribution: ConfidenceDistribution,
    pub error_count: usize,
    pub raw_count: usize,
    pub ai_queries_used: u32,
}

// --- Helpers ---

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommaJoined {
    Text(String),
    List(Vec<String>),
}

fn comma_joined<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<CommaJoined>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        CommaJoined::Text(text) => text,
        CommaJoined::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }))
}
