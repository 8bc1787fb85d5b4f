use chrono::NaiveDate;

use crate::models::{ClosedDomain, ProductType, Project, Scale, SortDirection, SortField, SupplyArea};

pub const EXTRACTION_RULES: &str = r#"
You convert requests for Brazilian cartographic products into a JSON search filter.

RULES:
1. Output ONLY one JSON object wrapped in ```json``` fences. No prose.
2. Include only fields the request actually mentions. Omit everything else.
3. Enumerated fields MUST use one of the listed values verbatim.
4. Dates are YYYY-MM-DD. Resolve relative periods against TODAY.
5. Map sheet codes (MI, INOM) go in "keyword" exactly as written.
6. "limit" is an integer between 1 and 100.
"#;

/// Build the system prompt for a given reference date.
pub fn build_system_prompt(today: NaiveDate) -> String {
    format!(
        r#"{EXTRACTION_RULES}
TODAY: {today}

ALLOWED VALUES:
- scale: {scale}
- productType: {product}
- supplyArea: {area}
- project: {project}
- sortField: {sort_field}
- sortDirection: {sort_direction}

OUTPUT SCHEMA:
```json
{{
  "keyword": "string",
  "scale": "one of scale",
  "productType": "one of productType",
  "state": "state name",
  "city": "city name",
  "supplyArea": "one of supplyArea",
  "project": "one of project",
  "publicationPeriod": {{"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}},
  "creationPeriod": {{"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}},
  "sortField": "one of sortField",
  "sortDirection": "one of sortDirection",
  "limit": 10
}}
```"#,
        today = today.format("%Y-%m-%d"),
        scale = domain_list::<Scale>(),
        product = domain_list::<ProductType>(),
        area = domain_list::<SupplyArea>(),
        project = domain_list::<Project>(),
        sort_field = domain_list::<SortField>(),
        sort_direction = domain_list::<SortDirection>(),
    )
}

fn domain_list<T: ClosedDomain>() -> String {
    T::members()
        .iter()
        .map(|m| format!("\"{}\"", m.label()))
        .collect::<Vec<_>>()
        .join(", ")
}
