use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Difficulty;

/// Hand-labeled query with its expected (partial) params.
///
/// `expected` stays a raw JSON object: labels may use spellings the
/// validator would normalize ("RJ", "1:25000").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub query: String,
    pub expected: Map<String, Value>,
    pub difficulty: Difficulty,
}

/// Points available for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldWeight {
    pub base_points: f64,
    /// Credit for producing the field at all.
    pub key_points: f64,
    /// Added on an exact value match.
    pub value_points: f64,
    /// Added instead of `value_points` on an approximate match.
    pub approximation_points: f64,
}

impl FieldWeight {
    pub fn new(key_points: f64, value_points: f64, approximation_points: f64) -> Self {
        Self {
            base_points: key_points + value_points,
            key_points,
            value_points,
            approximation_points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMultipliers {
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
}

impl Default for DifficultyMultipliers {
    fn default() -> Self {
        Self {
            easy: 1.0,
            medium: 1.5,
            hard: 2.0,
        }
    }
}

impl DifficultyMultipliers {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Weights per wire field name and the difficulty multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub difficulty_multiplier: DifficultyMultipliers,
    pub field_weights: BTreeMap<String, FieldWeight>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let filter = FieldWeight::new(3.0, 7.0, 4.0);
        let ordering = FieldWeight::new(2.0, 3.0, 0.0);

        let mut field_weights = BTreeMap::new();
        for field in [
            "keyword",
            "scale",
            "productType",
            "state",
            "city",
            "supplyArea",
            "project",
            "publicationPeriod",
            "creationPeriod",
        ] {
            field_weights.insert(field.to_string(), filter);
        }
        for field in ["sortField", "sortDirection", "limit"] {
            field_weights.insert(field.to_string(), ordering);
        }

        Self {
            difficulty_multiplier: DifficultyMultipliers::default(),
            field_weights,
        }
    }
}

impl ScoringConfig {
    pub fn weight(&self, field: &str) -> Option<&FieldWeight> {
        self.field_weights.get(field)
    }
}
