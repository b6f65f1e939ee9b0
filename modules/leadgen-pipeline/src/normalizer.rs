//! Record Normalizer: maps heterogeneous scraper records onto `CanonicalLead`.
//!
//! Fields whose shape varies between records are modelled as untagged
//! unions, each with one resolution function. A record is only rejected
//! when it is not a key-value object or a field has an impossible shape.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use leadgen_common::{
    CanonicalLead, ConfidenceLevel, LeadgenError, SearchCriteria, DEFAULT_CONFIDENCE_SCORE,
};

// ---------------------------------------------------------------------------
// Raw record shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExternalRecord {
    pub id: Option<Scalar>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub title: Option<String>,
    pub organization: Option<OrganizationField>,
    pub organization_num_employees: Option<Scalar>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub industry: Option<StringOrList>,
    pub organization_industry: Option<StringOrList>,
    pub keywords: Option<StringOrList>,
    pub organization_keywords: Option<StringOrList>,
    pub confidence_score: Option<Scalar>,
}

/// A single string or an explicit list. Null list entries are tolerated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    Text(String),
    List(Vec<Option<String>>),
}

impl StringOrList {
    /// Text is split on commas. Empty tokens and null entries are dropped.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            StringOrList::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            StringOrList::List(_) => self.values(),
        }
    }

    /// Text is one value, unsplit (industry names may contain commas).
    pub fn values(&self) -> Vec<String> {
        match self {
            StringOrList::Text(text) => non_empty(Some(text.clone())).into_iter().collect(),
            StringOrList::List(items) => items
                .iter()
                .filter_map(|item| non_empty(item.clone()))
                .collect(),
        }
    }
}

/// Organization given either by name or as a nested object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OrganizationField {
    Name(String),
    Nested(OrganizationDetails),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrganizationDetails {
    pub name: Option<String>,
    pub organization_name: Option<String>,
    pub estimated_num_employees: Option<Scalar>,
}

impl OrganizationField {
    /// `name` wins over `organization_name` for nested organizations.
    pub fn company_name(&self) -> Option<String> {
        match self {
            OrganizationField::Name(name) => non_empty(Some(name.clone())),
            OrganizationField::Nested(details) => non_empty(details.name.clone())
                .or_else(|| non_empty(details.organization_name.clone())),
        }
    }

    pub fn employee_count(&self) -> Option<String> {
        match self {
            OrganizationField::Name(_) => None,
            OrganizationField::Nested(details) => {
                details.estimated_num_employees.as_ref().and_then(Scalar::render)
            }
        }
    }
}

/// A number or a string carrying one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Render as text. Zero, blank and non-finite values count as absent.
    pub fn render(&self) -> Option<String> {
        match self {
            Scalar::Integer(0) => None,
            Scalar::Integer(n) => Some(n.to_string()),
            Scalar::Float(f) if !f.is_finite() || *f == 0.0 => None,
            Scalar::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Text(text) => non_empty(Some(text.clone())),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(text) => text.trim().parse().ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Parse and normalize one raw scraper item.
pub fn normalize(raw: &Value, criteria: &SearchCriteria) -> Result<CanonicalLead, LeadgenError> {
    if !raw.is_object() {
        return Err(LeadgenError::Normalization(format!(
            "expected a key-value record, got {}",
            value_kind(raw)
        )));
    }

    let record = RawExternalRecord::deserialize(raw)
        .map_err(|e| LeadgenError::Normalization(e.to_string()))?;
    Ok(from_record(record, criteria))
}

/// Map an already-parsed record. Total over every `RawExternalRecord`.
pub fn from_record(record: RawExternalRecord, criteria: &SearchCriteria) -> CanonicalLead {
    let first_name = non_empty(record.first_name);
    let last_name = non_empty(record.last_name);
    let full_name = non_empty(record.name).or_else(|| join_name(&first_name, &last_name));

    let email = non_empty(record.email);
    let confidence_level = if email.is_some() {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    };

    let company_name = record.organization.as_ref().and_then(OrganizationField::company_name);
    let company_size = record
        .organization_num_employees
        .as_ref()
        .and_then(Scalar::render)
        .or_else(|| record.organization.as_ref().and_then(OrganizationField::employee_count));

    CanonicalLead {
        id: record
            .id
            .as_ref()
            .and_then(Scalar::render)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        first_name,
        last_name,
        full_name,
        email,
        phone: non_empty(record.phone),
        linkedin_url: non_empty(record.linkedin_url).map(|url| with_scheme(&url)),
        job_title: non_empty(record.title),
        company_name,
        company_size,
        industry: industries(record.industry.as_ref(), record.organization_industry.as_ref()),
        location: location(&[record.city, record.state, record.country]),
        keywords: keywords(record.keywords.as_ref(), record.organization_keywords.as_ref()),
        confidence_score: confidence_score(record.confidence_score.as_ref()),
        confidence_level,
        source_criteria: criteria.clone(),
    }
}

fn join_name(first: &Option<String>, last: &Option<String>) -> Option<String> {
    let joined = [first.as_deref(), last.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(Some(joined))
}

fn location(parts: &[Option<String>]) -> Option<String> {
    let joined = parts
        .iter()
        .filter_map(|p| p.as_deref().map(str::trim))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    non_empty(Some(joined))
}

/// Primary industries first, then the organization's, skipping exact repeats.
fn industries(primary: Option<&StringOrList>, organization: Option<&StringOrList>) -> Vec<String> {
    let candidates = [primary, organization]
        .into_iter()
        .flatten()
        .flat_map(StringOrList::values);
    dedup_in_order(candidates)
}

/// Union of both keyword sources with exact-string duplicates removed.
/// First-seen order is kept so repeated runs compare equal.
fn keywords(primary: Option<&StringOrList>, organization: Option<&StringOrList>) -> Vec<String> {
    let candidates = [primary, organization]
        .into_iter()
        .flatten()
        .flat_map(StringOrList::tokens)
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty());
    dedup_in_order(candidates)
}

fn dedup_in_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for item in items {
        if !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged
}

/// Unparseable or non-finite scores fall back to the default.
fn confidence_score(score: Option<&Scalar>) -> f64 {
    score
        .and_then(Scalar::as_f64)
        .filter(|s| s.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE_SCORE)
        .clamp(0.0, 1.0)
}

fn with_scheme(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
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
    fn full_record_maps_every_field() {
        let raw = json!({
            "id": "apollo-1",
            "firstName": "Mei",
            "lastName": "Lin",
            "email": "mei@glowlabs.tw",
            "phone": "+886 2 1234 5678",
            "linkedinUrl": "linkedin.com/in/meilin",
            "title": "Founder",
            "organization": {"name": "Glow Labs", "organization_name": "Glow Labs Ltd"},
            "organizationNumEmployees": 42,
            "city": "Taipei",
            "state": "",
            "country": "Taiwan",
            "industry": "cosmetics",
            "organizationIndustry": "retail",
            "keywords": "skincare, beauty",
        });

        let lead = normalize(&raw, &criteria()).unwrap();

        assert_eq!(lead.id, "apollo-1");
        assert_eq!(lead.full_name.as_deref(), Some("Mei Lin"));
        assert_eq!(lead.linkedin_url.as_deref(), Some("https://linkedin.com/in/meilin"));
        assert_eq!(lead.company_name.as_deref(), Some("Glow Labs"));
        assert_eq!(lead.company_size.as_deref(), Some("42"));
        assert_eq!(lead.location.as_deref(), Some("Taipei, Taiwan"));
        assert_eq!(lead.industry, vec!["cosmetics", "retail"]);
        assert_eq!(lead.keywords, vec!["skincare", "beauty"]);
        assert_eq!(lead.confidence_level, ConfidenceLevel::High);
        assert_eq!(lead.confidence_score, DEFAULT_CONFIDENCE_SCORE);
        assert_eq!(lead.source_criteria, criteria());
    }

    #[test]
    fn missing_organization_yields_no_company() {
        let lead = normalize(&json!({"firstName": "Mei"}), &criteria()).unwrap();
        assert_eq!(lead.company_name, None);
        assert_eq!(lead.company_size, None);
    }

    #[test]
    fn nested_organization_falls_back_to_organization_name() {
        let raw = json!({
            "organization": {"organization_name": "Glow Labs Ltd", "estimated_num_employees": "120"}
        });
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.company_name.as_deref(), Some("Glow Labs Ltd"));
        assert_eq!(lead.company_size.as_deref(), Some("120"));
    }

    #[test]
    fn plain_string_organization_used_directly() {
        let lead = normalize(&json!({"organization": "Glow Labs"}), &criteria()).unwrap();
        assert_eq!(lead.company_name.as_deref(), Some("Glow Labs"));
    }

    #[test]
    fn keywords_merge_without_exact_duplicates() {
        let raw = json!({
            "keywords": "beauty, beauty, Skincare",
            "organizationKeywords": ["Skincare", "growth"],
        });
        let lead = normalize(&raw, &criteria()).unwrap();

        let mut keywords = lead.keywords.clone();
        keywords.sort();
        assert_eq!(keywords, vec!["Skincare", "beauty", "growth"]);
    }

    #[test]
    fn keyword_list_preserves_casing_variants() {
        let raw = json!({"keywords": ["Beauty", "beauty"]});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.keywords, vec!["Beauty", "beauty"]);
    }

    #[test]
    fn repeated_industry_kept_once() {
        let raw = json!({"industry": "cosmetics", "organizationIndustry": "cosmetics"});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.industry, vec!["cosmetics"]);
    }

    #[test]
    fn list_valued_industries_merged_in_source_order() {
        let raw = json!({
            "email": "mei@glowlabs.tw",
            "industry": ["cosmetics", "retail"],
            "organizationIndustry": ["retail", "health, wellness & fitness"],
        });
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.industry, vec!["cosmetics", "retail", "health, wellness & fitness"]);
    }

    #[test]
    fn string_industry_kept_whole() {
        let raw = json!({"industry": "health, wellness & fitness"});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.industry, vec!["health, wellness & fitness"]);
    }

    #[test]
    fn organization_keywords_accept_comma_joined_text() {
        let raw = json!({"keywords": ["beauty"], "organizationKeywords": "growth, beauty"});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.keywords, vec!["beauty", "growth"]);
    }

    #[test]
    fn null_list_entries_dropped() {
        let raw = json!({"keywords": ["skincare", null, ""], "industry": [null, "cosmetics"]});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.keywords, vec!["skincare"]);
        assert_eq!(lead.industry, vec!["cosmetics"]);
    }

    #[test]
    fn textual_confidence_score_parsed() {
        let lead = normalize(&json!({"confidenceScore": "0.9"}), &criteria()).unwrap();
        assert_eq!(lead.confidence_score, 0.9);
    }

    #[test]
    fn unparseable_confidence_score_uses_default() {
        let lead = normalize(&json!({"confidenceScore": "high"}), &criteria()).unwrap();
        assert_eq!(lead.confidence_score, DEFAULT_CONFIDENCE_SCORE);
    }

    #[test]
    fn full_name_derived_from_single_part() {
        let lead = normalize(&json!({"lastName": "Lin"}), &criteria()).unwrap();
        assert_eq!(lead.full_name.as_deref(), Some("Lin"));
    }

    #[test]
    fn explicit_name_wins_over_parts() {
        let raw = json!({"firstName": "Mei", "lastName": "Lin", "name": "Mei-Ling Lin"});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.full_name.as_deref(), Some("Mei-Ling Lin"));
    }

    #[test]
    fn existing_scheme_left_alone() {
        let raw = json!({"linkedinUrl": "http://www.linkedin.com/in/meilin"});
        let lead = normalize(&raw, &criteria()).unwrap();
        assert_eq!(lead.linkedin_url.as_deref(), Some("http://www.linkedin.com/in/meilin"));
    }

    #[test]
    fn confidence_score_clamped_to_unit_range() {
        let high = normalize(&json!({"confidenceScore": 1.7}), &criteria()).unwrap();
        let low = normalize(&json!({"confidenceScore": -0.2}), &criteria()).unwrap();
        assert_eq!(high.confidence_score, 1.0);
        assert_eq!(low.confidence_score, 0.0);
    }

    #[test]
    fn no_email_means_medium_confidence() {
        let lead = normalize(&json!({"phone": "+886 2 1234 5678"}), &criteria()).unwrap();
        assert_eq!(lead.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn empty_record_yields_minimal_lead() {
        let lead = normalize(&json!({}), &criteria()).unwrap();
        assert!(!lead.id.is_empty());
        assert_eq!(lead.full_name, None);
        assert_eq!(lead.location, None);
        assert!(lead.industry.is_empty());
        assert!(lead.keywords.is_empty());
    }

    #[test]
    fn numeric_id_reused_as_text() {
        let lead = normalize(&json!({"id": 981}), &criteria()).unwrap();
        assert_eq!(lead.id, "981");
    }

    #[test]
    fn non_object_input_rejected() {
        for raw in [json!(["not", "a", "record"]), json!("text"), json!(null)] {
            let err = normalize(&raw, &criteria()).unwrap_err();
            assert!(matches!(err, LeadgenError::Normalization(_)));
        }
    }

    #[test]
    fn impossible_field_shape_rejected() {
        let err = normalize(&json!({"organization": ["a", "b"]}), &criteria()).unwrap_err();
        assert!(matches!(err, LeadgenError::Normalization(_)));
    }

    #[test]
    fn normalizing_twice_differs_only_in_minted_id() {
        let raw = json!({
            "firstName": "Mei",
            "keywords": "beauty, Skincare",
            "organizationKeywords": ["growth"],
        });
        let first = normalize(&raw, &criteria()).unwrap();
        let second = normalize(&raw, &criteria()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(CanonicalLead { id: second.id.clone(), ..first }, second);
    }
}
