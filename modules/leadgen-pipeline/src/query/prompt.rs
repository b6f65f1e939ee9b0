use leadgen_common::{SearchCriteria, INDUSTRY_IDS};

use super::QueryMode;

const EXAMPLE_URL: &str = "https://app.apollo.io/#/people?page=1&contactEmailStatusV2[]=verified&personTitles[]=project%20manager&personTitles[]=director&personLocations[]=United%20States&organizationIndustryTagIds[]=5567cdd67369643e64020000&organizationIndustryTagIds[]=5567ced173696450cb580000&organizationNumEmployeesRanges[]=11%2C50&qOrganizationKeywordTags[]=Google&includedOrganizationKeywordFields[]=name&qAndedOrganizationKeywordTags[]=startup&includedAndedOrganizationKeywordFields[]=tags&includedAndedOrganizationKeywordFields[]=social_media_description";

const EXAMPLE_EXPLANATION: &str = "\
This URL searches for people who:
1. Have a verified email.
2. Hold the title project manager or director.
3. Are located in the United States.
4. Work in Financial Services or Retail, each replaced by its industry ID from the reference below.
5. Work at a company with 11-50 employees.
6. Work at a company named \"Google\".
7. Work at a company tagged or described as a \"startup\".";

const PARAMETER_RULES: &str = "\
- Company names go in qOrganizationKeywordTags[]=NAME (one per company) followed by includedOrganizationKeywordFields[]=name. A company mentioned in the description (\"engineer at Anthropic\") is a company name.
- Company concepts such as \"startup\", \"VC-backed\" or \"remote-first\" are required keywords: qAndedOrganizationKeywordTags[]=KEYWORD (one per keyword) followed by includedAndedOrganizationKeywordFields[]=tags and includedAndedOrganizationKeywordFields[]=social_media_description.
- Company sizes use organizationNumEmployeesRanges[] with one of 1%2C10, 11%2C50, 51%2C200, 201%2C500, 501%2C1000, 1001%2C5000, 5001%2C10000, 10001%2C.
- Percent-encode every value. Only change the parameters shown in the example.";

const FREE_TEXT_INSTRUCTIONS: &str = "\
No structured filters were given. Extract titles, locations, industries, company sizes, company names and keywords from the Input Description, then build the URL from them.
Do not add any filter that the description does not state explicitly. For \"Software engineers at OpenAI\" do not add an \"open-source\" keyword.";

const STRUCTURED_INSTRUCTIONS: &str = "\
Structured filters were given. Use exactly the filter values listed under Filters and nothing else.
The Input Description is context for disambiguation only. Never derive additional filters from it, and emit no parameter for a filter marked Not specified.";

/// Instruction for the query oracle. The reply must be a single JSON object
/// of the form `{"searchUrl": "..."}`.
pub fn build_prompt(criteria: &SearchCriteria, mode: QueryMode) -> String {
    let instructions = match mode {
        QueryMode::FreeTextParsed => FREE_TEXT_INSTRUCTIONS,
        QueryMode::StructuredDirect => STRUCTURED_INSTRUCTIONS,
    };
    let filters = criteria.filters();
    let show = |value: &Option<String>| {
        value.clone().unwrap_or_else(|| "Not specified".to_string())
    };

    format!(
        r#"Turn a description of a prospect audience into an Apollo people search URL.

Example URL:
{EXAMPLE_URL}

{EXAMPLE_EXPLANATION}

Parameter rules:
{PARAMETER_RULES}

{instructions}

Industry ID Reference:
{industries}

Input Description: "{description}"

Filters:
- Job Title: {job_title}
- Industry: {industry}
- Location: {location}
- Company Size: {company_size}
- Company Names: {company_names}
- Keywords: {keywords}

Return only this JSON object:
{{"searchUrl": "Search URL goes here"}}
"#,
        industries = industry_reference(),
        description = criteria.free_text().unwrap_or_default(),
        job_title = show(&filters.job_title),
        industry = show(&filters.industry),
        location = show(&filters.location),
        company_size = show(&filters.company_size_range),
        company_names = show(&filters.company_names),
        keywords = show(&filters.keywords),
    )
}

fn industry_reference() -> String {
    INDUSTRY_IDS
        .iter()
        .map(|(name, id)| format!("- {name}: {id}"))
        .collect::<Vec<_>>()
        .join("\n")
}
