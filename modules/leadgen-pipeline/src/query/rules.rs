use async_trait::async_trait;
use tracing::debug;

use leadgen_common::{employee_range_token, industry_id, LeadFilters, SearchCriteria};

use super::{Attempt, QueryMode, QuerySource, QueryStrategy, BASE_SEARCH_URL};

/// Deterministic filter-to-parameter assembly. Always resolves.
pub struct RuleBasedStrategy;

#[async_trait]
impl QueryStrategy for RuleBasedStrategy {
    fn source(&self) -> QuerySource {
        QuerySource::RuleBased
    }

    async fn attempt(&self, criteria: &SearchCriteria, _mode: QueryMode) -> Attempt {
        Attempt::Resolved(assemble_query(criteria.filters()))
    }
}

/// Build the search URL from structured filters alone. Free text is never
/// parsed here, so free-text-only criteria yield the bare base URL.
pub fn assemble_query(filters: &LeadFilters) -> String {
    let mut url = String::from(BASE_SEARCH_URL);

    for title in filters.job_titles() {
        push_param(&mut url, "personTitles[]", &encode(title));
    }

    if let Some(location) = &filters.location {
        push_param(&mut url, "personLocations[]", &encode(location));
    }

    for tag_id in industry_tag_ids(filters) {
        push_param(&mut url, "organizationIndustryTagIds[]", tag_id);
    }

    if let Some(size) = &filters.company_size_range {
        match employee_range_token(size) {
            Some(token) => push_param(&mut url, "organizationNumEmployeesRanges[]", token),
            None => debug!(size = %size, "Unknown company size range dropped"),
        }
    }

    let companies = filters.company_name_list();
    if !companies.is_empty() {
        for company in companies {
            push_param(&mut url, "qOrganizationKeywordTags[]", &encode(company));
        }
        push_param(&mut url, "includedOrganizationKeywordFields[]", "name");
    }

    let keywords = filters.keyword_list();
    if !keywords.is_empty() {
        for keyword in keywords {
            push_param(&mut url, "qAndedOrganizationKeywordTags[]", &encode(keyword));
        }
        push_param(&mut url, "includedAndedOrganizationKeywordFields[]", "tags");
        push_param(
            &mut url,
            "includedAndedOrganizationKeywordFields[]",
            "social_media_description",
        );
    }

    url
}

/// Industry names may themselves contain commas ("health, wellness & fitness"),
/// so the whole value is looked up before splitting it into a list.
fn industry_tag_ids(filters: &LeadFilters) -> Vec<&'static str> {
    let Some(industry) = &filters.industry else {
        return Vec::new();
    };
    if let Some(id) = industry_id(industry) {
        return vec![id];
    }

    let mut ids = Vec::new();
    for name in filters.industries() {
        match industry_id(name) {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => debug!(industry = %name, "Unknown industry dropped"),
        }
    }
    ids
}

fn push_param(url: &mut String, key: &str, value: &str) {
    url.push('&');
    url.push_str(key);
    url.push('=');
    url.push_str(value);
}

/// Percent-encode a value, with spaces as `%20`.
fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> LeadFilters {
        LeadFilters::default()
    }

    #[test]
    fn empty_filters_yield_base_url_only() {
        assert_eq!(assemble_query(&filters()), BASE_SEARCH_URL);
    }

    #[test]
    fn job_titles_split_and_encoded() {
        let query = assemble_query(&LeadFilters {
            job_title: Some("project manager, Director".to_string()),
            ..filters()
        });
        assert_eq!(
            query,
            format!("{BASE_SEARCH_URL}&personTitles[]=project%20manager&personTitles[]=Director")
        );
    }

    #[test]
    fn location_kept_whole() {
        let query = assemble_query(&LeadFilters {
            location: Some("San Francisco, CA".to_string()),
            ..filters()
        });
        assert!(query.ends_with("&personLocations[]=San%20Francisco%2C%20CA"));
    }

    #[test]
    fn company_size_maps_to_single_token() {
        let query = assemble_query(&LeadFilters {
            company_size_range: Some("51-200".to_string()),
            ..filters()
        });
        assert_eq!(query.matches("organizationNumEmployeesRanges[]=").count(), 1);
        assert!(query.ends_with("&organizationNumEmployeesRanges[]=51%2C200"));
        assert!(!query.contains("201%2C500"));
    }

    #[test]
    fn unknown_company_size_dropped() {
        let query = assemble_query(&LeadFilters {
            company_size_range: Some("about twenty".to_string()),
            ..filters()
        });
        assert_eq!(query, BASE_SEARCH_URL);
    }

    #[test]
    fn industry_with_embedded_comma_resolves() {
        let query = assemble_query(&LeadFilters {
            industry: Some("Health, Wellness & Fitness".to_string()),
            ..filters()
        });
        assert!(query.ends_with("&organizationIndustryTagIds[]=5567cddb7369644d250c0000"));
    }

    #[test]
    fn industry_list_resolves_known_names_only() {
        let query = assemble_query(&LeadFilters {
            industry: Some("Cosmetics, Retail, Basket Weaving".to_string()),
            ..filters()
        });
        assert!(query.contains("organizationIndustryTagIds[]=5567e1ae73696423dc040000"));
        assert!(query.contains("organizationIndustryTagIds[]=5567ced173696450cb580000"));
        assert_eq!(query.matches("organizationIndustryTagIds[]=").count(), 2);
    }

    #[test]
    fn company_names_become_or_keyword_tags() {
        let query = assemble_query(&LeadFilters {
            company_names: Some("Google, AT&T".to_string()),
            ..filters()
        });
        assert!(query.ends_with(
            "&qOrganizationKeywordTags[]=Google&qOrganizationKeywordTags[]=AT%26T&includedOrganizationKeywordFields[]=name"
        ));
    }

    #[test]
    fn keywords_become_and_keyword_tags() {
        let query = assemble_query(&LeadFilters {
            keywords: Some("startup".to_string()),
            ..filters()
        });
        assert!(query.ends_with(
            "&qAndedOrganizationKeywordTags[]=startup&includedAndedOrganizationKeywordFields[]=tags&includedAndedOrganizationKeywordFields[]=social_media_description"
        ));
    }

    #[test]
    fn unspecified_fields_emit_no_parameters() {
        let query = assemble_query(&LeadFilters {
            job_title: Some("CEO".to_string()),
            ..filters()
        });
        for absent in [
            "personLocations",
            "organizationIndustryTagIds",
            "organizationNumEmployeesRanges",
            "qOrganizationKeywordTags",
            "qAndedOrganizationKeywordTags",
        ] {
            assert!(!query.contains(absent), "{absent} should be absent: {query}");
        }
    }
}
