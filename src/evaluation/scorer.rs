//! Weighted partial-credit comparison of produced params against labels.
//!
//! Per expected field: presence earns `keyPoints`, an exact value adds
//! `valuePoints`, an approximate value adds `approximationPoints`. Both the
//! earned and the possible points are scaled by the case's difficulty
//! multiplier. Scoring never fails.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Difficulty, SearchParams};
use crate::pipeline::validation::parse_iso_date;

use super::states::states_equivalent;
use super::types::{ScoringConfig, TestCase};

/// Per-endpoint slack when comparing date ranges.
pub const DATE_TOLERANCE_DAYS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    Absent,
    Approximate,
    Incorrect,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "field absent",
            Self::Approximate => "approximate",
            Self::Incorrect => "incorrect value",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub field: String,
    pub kind: MismatchKind,
    pub expected: Value,
    pub actual: Option<Value>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: {} (expected {}, got {})",
                self.field, self.kind, self.expected, actual
            ),
            None => write!(f, "{}: {} (expected {})", self.field, self.kind, self.expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldScore {
    pub field: String,
    pub earned: f64,
    pub possible: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CaseScore {
    pub earned: f64,
    pub possible: f64,
    pub fields: Vec<FieldScore>,
    pub mismatches: Vec<Mismatch>,
}

impl CaseScore {
    /// Earned share in percent. A case with nothing to score counts as 100.
    pub fn percent(&self) -> f64 {
        if self.possible <= 0.0 {
            100.0
        } else {
            self.earned / self.possible * 100.0
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.mismatches.is_empty()
    }
}

enum Comparison {
    Exact,
    Approximate,
    Incorrect,
}

pub struct AccuracyScorer {
    config: ScoringConfig,
}

impl AccuracyScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score produced params against a labeled case.
    pub fn score(&self, case: &TestCase, actual: &SearchParams) -> CaseScore {
        self.score_fields(&case.expected, &actual.to_fields(), case.difficulty)
    }

    /// Score raw field maps. Expected fields without a configured weight are skipped.
    pub fn score_fields(
        &self,
        expected: &Map<String, Value>,
        actual: &Map<String, Value>,
        difficulty: Difficulty,
    ) -> CaseScore {
        let multiplier = self.config.difficulty_multiplier.for_difficulty(difficulty);
        let mut score = CaseScore::default();

        for (field, expected_value) in expected {
            let Some(weight) = self.config.weight(field) else {
                tracing::debug!(field = %field, "No scoring weight for field, skipping");
                continue;
            };
            let possible = weight.base_points * multiplier;

            let (points, mismatch) = match actual.get(field) {
                None => (0.0, Some(MismatchKind::Absent)),
                Some(actual_value) => match compare(field, expected_value, actual_value) {
                    Comparison::Exact => (weight.key_points + weight.value_points, None),
                    Comparison::Approximate => (
                        weight.key_points + weight.approximation_points,
                        Some(MismatchKind::Approximate),
                    ),
                    Comparison::Incorrect => (weight.key_points, Some(MismatchKind::Incorrect)),
                },
            };

            let earned = points * multiplier;
            score.earned += earned;
            score.possible += possible;
            score.fields.push(FieldScore {
                field: field.clone(),
                earned,
                possible,
            });
            if let Some(kind) = mismatch {
                score.mismatches.push(Mismatch {
                    field: field.clone(),
                    kind,
                    expected: expected_value.clone(),
                    actual: actual.get(field).cloned(),
                });
            }
        }

        score
    }
}

impl Default for AccuracyScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

fn compare(field: &str, expected: &Value, actual: &Value) -> Comparison {
    if values_equal(expected, actual) {
        return Comparison::Exact;
    }
    match (field, expected.as_str(), actual.as_str()) {
        ("scale", Some(e), Some(a)) if strip_scale(e) == strip_scale(a) => Comparison::Exact,
        ("state", Some(e), Some(a)) if states_equivalent(e, a) => Comparison::Approximate,
        _ => Comparison::Incorrect,
    }
}

/// Deep equality. Numbers compare by value, date ranges allow one day of slack per endpoint.
pub fn values_equal(expected: &Value, actual: &Value) -> bool {
    if let (Some(e), Some(a)) = (date_bounds(expected), date_bounds(actual)) {
        return (e.0 - a.0).num_days().abs() <= DATE_TOLERANCE_DAYS
            && (e.1 - a.1).num_days().abs() <= DATE_TOLERANCE_DAYS;
    }
    match (expected, actual) {
        (Value::Number(e), Value::Number(a)) => e.as_f64() == a.as_f64(),
        (Value::Array(e), Value::Array(a)) => {
            e.len() == a.len() && e.iter().zip(a).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(e), Value::Object(a)) => {
            e.len() == a.len()
                && e.iter().all(|(k, x)| a.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => expected == actual,
    }
}

fn date_bounds(value: &Value) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    let object = value.as_object()?;
    let start = parse_iso_date(object.get("start")?.as_str()?)?;
    let end = parse_iso_date(object.get("end")?.as_str()?)?;
    Some((start, end))
}

fn strip_scale(scale: &str) -> String {
    scale.chars().filter(|c| !matches!(c, ':' | '.') && !c.is_whitespace()).collect()
}
