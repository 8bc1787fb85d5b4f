//! Candidate validation: turns an untrusted JSON object into `SearchParams`.
//!
//! Only one failure is fatal: input that is not a JSON object at all.
//! Every per-field problem drops that field and records a warning.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{
    ClosedDomain, DateRange, ProductType, Project, Scale, SearchParams, SortDirection, SortField,
    SupplyArea, LIMIT_MAX, LIMIT_MIN,
};

use super::normalize::{collapse_whitespace, fold};
use super::sanitize::{extract_json_block, sanitize_llm_output};
use super::QueryError;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validated params plus one warning per dropped or defaulted field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub params: SearchParams,
    pub warnings: Vec<String>,
}

/// Sanitize raw LLM text and parse it into a JSON object.
pub fn parse_candidate(raw: &str) -> Result<Map<String, Value>, QueryError> {
    let cleaned = sanitize_llm_output(raw);
    let block = extract_json_block(&cleaned).unwrap_or_else(|| cleaned.trim());
    let value: Value =
        serde_json::from_str(block).map_err(|e| QueryError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(QueryError::Validation(json_type_name(&other).to_string())),
    }
}

/// Parse and validate raw LLM output in one step.
pub fn validate_llm_output(raw: &str) -> Result<ValidationOutcome, QueryError> {
    let fields = parse_candidate(raw)?;
    Ok(validate_fields(&fields))
}

/// Validate an already-parsed value. Anything but an object is rejected.
pub fn validate_candidate(candidate: &Value) -> Result<ValidationOutcome, QueryError> {
    match candidate {
        Value::Object(fields) => Ok(validate_fields(fields)),
        other => Err(QueryError::Validation(json_type_name(other).to_string())),
    }
}

/// Validate every known field independently. Never fails.
pub fn validate_fields(fields: &Map<String, Value>) -> ValidationOutcome {
    let mut v = FieldValidator::default();
    let mut params = SearchParams::default();

    for (key, value) in fields {
        if is_empty_value(value) {
            continue;
        }
        match key.as_str() {
            "keyword" => params.keyword = v.text(key, value),
            "state" => params.state = v.text(key, value),
            "city" => params.city = v.text(key, value),
            "scale" => params.scale = v.domain::<Scale>(value),
            "productType" => params.product_type = v.domain::<ProductType>(value),
            "supplyArea" => params.supply_area = v.domain::<SupplyArea>(value),
            "project" => params.project = v.domain::<Project>(value),
            "publicationPeriod" => params.publication_period = v.period(key, value),
            "creationPeriod" => params.creation_period = v.period(key, value),
            "sortField" => params.sort_field = v.domain::<SortField>(value).unwrap_or_default(),
            "sortDirection" => {
                params.sort_direction = v.domain::<SortDirection>(value).unwrap_or_default()
            }
            "limit" => params.limit = v.limit(value),
            _ => v.reject(key, "unknown field"),
        }
    }

    ValidationOutcome {
        params,
        warnings: v.warnings,
    }
}

/// Resolve free text against a closed domain.
///
/// Tries an exact match, then a case/diacritic-insensitive match (which also
/// treats `º` and `°` alike). Anything else is None rather than a guess:
/// punctuation is never stripped, so "1:250.00" does not become a scale.
pub fn resolve_domain<T: ClosedDomain>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(member) = T::members().iter().find(|m| m.label() == trimmed) {
        return Some(*member);
    }

    let key = domain_key(trimmed);
    T::members()
        .iter()
        .find(|m| domain_key(m.label()) == key)
        .copied()
}

fn domain_key(text: &str) -> String {
    fold(&collapse_whitespace(text)).replace('º', "°")
}

/// Strict `YYYY-MM-DD` parse.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !ISO_DATE_RE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[derive(Default)]
struct FieldValidator {
    warnings: Vec<String>,
}

impl FieldValidator {
    fn reject(&mut self, field: &str, reason: &str) {
        tracing::debug!(field, reason, "Dropping candidate field");
        self.warnings.push(format!("{field}: {reason}"));
    }

    fn text(&mut self, field: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => {
                let text = collapse_whitespace(s);
                (!text.is_empty()).then_some(text)
            }
            _ => {
                self.reject(field, "expected a string");
                None
            }
        }
    }

    fn domain<T: ClosedDomain>(&mut self, value: &Value) -> Option<T> {
        let Some(raw) = value.as_str() else {
            self.reject(T::FIELD, "expected a string");
            return None;
        };
        let resolved = resolve_domain::<T>(raw);
        if resolved.is_none() {
            self.reject(T::FIELD, &format!("unrecognized value \"{raw}\""));
        }
        resolved
    }

    fn period(&mut self, field: &str, value: &Value) -> Option<DateRange> {
        let Some(object) = value.as_object() else {
            self.reject(field, "expected an object with start and end");
            return None;
        };
        let bound = |name: &str| object.get(name).and_then(Value::as_str).and_then(parse_iso_date);
        let (Some(start), Some(end)) = (bound("start"), bound("end")) else {
            self.reject(field, "start and end must be YYYY-MM-DD dates");
            return None;
        };
        let range = DateRange::new(start, end);
        if range.is_none() {
            self.reject(field, "start is after end");
        }
        range
    }

    fn limit(&mut self, value: &Value) -> Option<u8> {
        let Some(n) = value.as_i64() else {
            self.reject("limit", "expected an integer");
            return None;
        };
        if !(i64::from(LIMIT_MIN)..=i64::from(LIMIT_MAX)).contains(&n) {
            self.reject("limit", &format!("{n} is outside {LIMIT_MIN}..={LIMIT_MAX}"));
            return None;
        }
        u8::try_from(n).ok()
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
