//! Rule-based field extraction used when the LLM is unavailable or its
//! output cannot be parsed.
//!
//! Runs on canonicalized text. Every field has one rule, and rules run in a
//! fixed order over a folded copy of the text. The result is a raw candidate
//! that still goes through the validator. Nothing here fails: a rule that
//! finds nothing simply leaves its field out.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::models::{
    DateRange, ProductType, Scale, SortDirection, SortField, SupplyArea, LIMIT_MAX, LIMIT_MIN,
};
use crate::vocabulary::TermMapping;

use super::dates::resolve_period;
use super::normalize::fold;

/// Folded canonical text plus the reference date for relative phrases.
pub struct RuleInput<'a> {
    pub folded: &'a str,
    pub today: NaiveDate,
}

/// One field extraction rule. Writes zero or more keys into the candidate.
pub struct FallbackRule {
    pub name: &'static str,
    apply: fn(&FallbackExtractor, &RuleInput<'_>, &mut Map<String, Value>),
}

/// Evaluation order of the per-field rules.
const RULES: &[FallbackRule] = &[
    FallbackRule { name: "scale", apply: apply_scale },
    FallbackRule { name: "productType", apply: apply_product_type },
    FallbackRule { name: "supplyArea", apply: apply_supply_area },
    FallbackRule { name: "project", apply: apply_project },
    FallbackRule { name: "sort", apply: apply_sort },
    FallbackRule { name: "limit", apply: apply_limit },
    FallbackRule { name: "dates", apply: apply_dates },
];

static SCALE_RATIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b1\s*[:/]?\s*(\d{2,3})\.?\s?000\b").expect("valid regex")
});

static SCALE_THOUSANDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,3})\s*k\b").expect("valid regex"));

/// Product keywords in priority order: topographic, then orthoimage, then thematic.
static PRODUCT_KEYWORDS: LazyLock<Vec<(Regex, ProductType)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\btopo").expect("valid regex"), ProductType::Topographic),
        (Regex::new(r"\borto").expect("valid regex"), ProductType::Orthoimage),
        (Regex::new(r"\btematic").expect("valid regex"), ProductType::Thematic),
    ]
});

static SUPPLY_AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d)\s*[°ºo]?\s*(?:cgeo|centro de geoinformacao)\b").expect("valid regex")
});

static RECENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:mais\s+recentes?|recentes?|recentemente|mais\s+nov[oa]s|atualizad[oa]s?|ultim[oa]s\s+publicad[oa]s|ultim[oa]s\s+lancad[oa]s)\b",
    )
    .expect("valid regex")
});

static OLDEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bantig\w*").expect("valid regex"));

static LIMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+)\s*(?:cartas?|resultados?|itens|item)\b").expect("valid regex")
});

/// Deterministic extractor. Holds the project aliases pre-folded, in dictionary order.
#[derive(Debug, Clone)]
pub struct FallbackExtractor {
    project_aliases: Vec<(String, String)>,
}

impl FallbackExtractor {
    pub fn new(project_aliases: &[TermMapping]) -> Self {
        let project_aliases = project_aliases
            .iter()
            .map(|m| (fold(m.alias.trim()), m.canonical.clone()))
            .filter(|(alias, _)| !alias.is_empty())
            .collect();
        Self { project_aliases }
    }

    /// The ordered rule list.
    pub fn rules() -> &'static [FallbackRule] {
        RULES
    }

    /// Extract a raw candidate from canonicalized text.
    pub fn extract(&self, canonical_text: &str, today: NaiveDate) -> Map<String, Value> {
        let folded = fold(canonical_text);
        let input = RuleInput {
            folded: &folded,
            today,
        };
        let mut candidate = Map::new();
        for rule in RULES {
            let before = candidate.len();
            (rule.apply)(self, &input, &mut candidate);
            if candidate.len() > before {
                tracing::debug!(rule = rule.name, "Fallback rule matched");
            }
        }
        candidate
    }

    /// Canonical name of the first project alias contained in the folded text.
    pub fn match_project(&self, folded: &str) -> Option<&str> {
        self.project_aliases
            .iter()
            .find(|(alias, _)| folded.contains(alias.as_str()))
            .map(|(_, canonical)| canonical.as_str())
    }
}

// ── Field rules ───────────────────────────────────────────

/// First scale in the closed set, trying `1:NN.000` forms before `NNk`.
pub fn extract_scale(folded: &str) -> Option<Scale> {
    [&*SCALE_RATIO_RE, &*SCALE_THOUSANDS_RE]
        .into_iter()
        .flat_map(|re| re.captures_iter(folded))
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .find_map(Scale::from_thousands)
}

pub fn extract_product_type(folded: &str) -> Option<ProductType> {
    PRODUCT_KEYWORDS
        .iter()
        .find(|(re, _)| re.is_match(folded))
        .map(|(_, product)| *product)
}

pub fn extract_supply_area(folded: &str) -> Option<SupplyArea> {
    let caps = SUPPLY_AREA_RE.captures(folded)?;
    let ordinal: u32 = caps.get(1)?.as_str().parse().ok()?;
    SupplyArea::from_ordinal(ordinal)
}

/// Sort order implied by recency or age wording. Recency is checked first.
pub fn extract_sort(folded: &str) -> Option<(SortField, SortDirection)> {
    if RECENT_RE.is_match(folded) {
        Some((SortField::PublicationDate, SortDirection::Desc))
    } else if OLDEST_RE.is_match(folded) {
        Some((SortField::PublicationDate, SortDirection::Asc))
    } else {
        None
    }
}

/// First "N cartas/resultados/itens" count inside the allowed page range.
pub fn extract_limit(folded: &str) -> Option<u8> {
    LIMIT_RE
        .captures_iter(folded)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .find(|n| (u32::from(LIMIT_MIN)..=u32::from(LIMIT_MAX)).contains(n))
        .and_then(|n| u8::try_from(n).ok())
}

fn apply_scale(_: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some(scale) = extract_scale(input.folded) {
        out.insert("scale".into(), json!(scale.as_str()));
    }
}

fn apply_product_type(_: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some(product) = extract_product_type(input.folded) {
        out.insert("productType".into(), json!(product.as_str()));
    }
}

fn apply_supply_area(_: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some(area) = extract_supply_area(input.folded) {
        out.insert("supplyArea".into(), json!(area.as_str()));
    }
}

fn apply_project(ex: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some(project) = ex.match_project(input.folded) {
        out.insert("project".into(), json!(project));
    }
}

fn apply_sort(_: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some((field, direction)) = extract_sort(input.folded) {
        out.insert("sortField".into(), json!(field.as_str()));
        out.insert("sortDirection".into(), json!(direction.as_str()));
    }
}

fn apply_limit(_: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some(limit) = extract_limit(input.folded) {
        out.insert("limit".into(), json!(limit));
    }
}

// Relative dates always land in publicationPeriod; creationPeriod is LLM-only.
fn apply_dates(_: &FallbackExtractor, input: &RuleInput<'_>, out: &mut Map<String, Value>) {
    if let Some(range) = resolve_period(input.folded, input.today) {
        out.insert("publicationPeriod".into(), period_value(&range));
    }
}

fn period_value(range: &DateRange) -> Value {
    json!({
        "start": range.start.format("%Y-%m-%d").to_string(),
        "end": range.end.format("%Y-%m-%d").to_string(),
    })
}
