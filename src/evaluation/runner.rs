//! Concurrent batch evaluation over labeled test cases.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::models::{Difficulty, SearchParams};
use crate::pipeline::{ExtractionSource, QueryPipeline};

use super::scorer::{AccuracyScorer, CaseScore};
use super::types::TestCase;
use super::EvaluationError;

const BUNDLED_TEST_CASES: &str = include_str!("../../resources/test_cases.json");

/// Number of slowest cases listed in the summary.
pub const SLOWEST_CASES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub index: usize,
    pub query: String,
    pub difficulty: Difficulty,
    pub source: ExtractionSource,
    pub params: SearchParams,
    pub score: CaseScore,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub earned: f64,
    pub possible: f64,
}

impl Totals {
    fn add(&mut self, earned: f64, possible: f64) {
        self.earned += earned;
        self.possible += possible;
    }

    pub fn percent(&self) -> f64 {
        if self.possible <= 0.0 {
            100.0
        } else {
            self.earned / self.possible * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TimingStats {
    pub total_ms: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlowCase {
    pub query: String,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedCase {
    pub query: String,
    pub difficulty: Difficulty,
    pub percent: f64,
    pub mismatches: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub run_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub total_cases: usize,
    pub overall: Totals,
    pub by_difficulty: BTreeMap<String, Totals>,
    pub by_field: BTreeMap<String, Totals>,
    pub timing: TimingStats,
    pub slowest: Vec<SlowCase>,
    pub failed: Vec<FailedCase>,
}

/// Read a JSON array of test cases.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, EvaluationError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| EvaluationError::Load(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&json)
        .map_err(|e| EvaluationError::Parse(path.display().to_string(), e.to_string()))
}

/// Sample cases compiled into the binary.
pub fn bundled_test_cases() -> Result<Vec<TestCase>, EvaluationError> {
    serde_json::from_str(BUNDLED_TEST_CASES)
        .map_err(|e| EvaluationError::Parse("test_cases.json".into(), e.to_string()))
}

/// Interpret and score one case, timing the interpretation.
pub fn run_case(
    pipeline: &QueryPipeline,
    scorer: &AccuracyScorer,
    index: usize,
    case: &TestCase,
    today: NaiveDate,
) -> CaseResult {
    let started = Instant::now();
    let interpretation = pipeline.interpret(&case.query, today);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let score = scorer.score(case, &interpretation.params);

    CaseResult {
        index,
        query: case.query.clone(),
        difficulty: case.difficulty,
        source: interpretation.source,
        params: interpretation.params,
        score,
        elapsed_ms,
    }
}

/// Run every case on the blocking pool, at most `max_concurrency` at a time.
pub async fn evaluate(
    pipeline: Arc<QueryPipeline>,
    scorer: Arc<AccuracyScorer>,
    cases: Vec<TestCase>,
    today: NaiveDate,
) -> Result<EvaluationSummary, EvaluationError> {
    let run_id = Uuid::new_v4();
    let permits = Arc::new(Semaphore::new(pipeline.config().max_concurrency.max(1)));
    tracing::info!(run_id = %run_id, cases = cases.len(), "Evaluation started");

    let mut tasks = JoinSet::new();
    for (index, case) in cases.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let scorer = Arc::clone(&scorer);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| EvaluationError::Task(e.to_string()))?;
            tokio::task::spawn_blocking(move || run_case(&pipeline, &scorer, index, &case, today))
                .await
                .map_err(|e| EvaluationError::Task(e.to_string()))
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let result = joined.map_err(|e| EvaluationError::Task(e.to_string()))??;
        results.push(result);
    }
    results.sort_by_key(|r| r.index);

    let summary = summarize(run_id, &results);
    tracing::info!(
        run_id = %run_id,
        overall_percent = summary.overall.percent(),
        failed = summary.failed.len(),
        "Evaluation finished"
    );
    Ok(summary)
}

/// Aggregate case results. Pure; results are expected in case order.
pub fn summarize(run_id: Uuid, results: &[CaseResult]) -> EvaluationSummary {
    let mut overall = Totals::default();
    let mut by_difficulty: BTreeMap<String, Totals> = BTreeMap::new();
    let mut by_field: BTreeMap<String, Totals> = BTreeMap::new();

    for result in results {
        overall.add(result.score.earned, result.score.possible);
        by_difficulty
            .entry(result.difficulty.as_str().to_string())
            .or_default()
            .add(result.score.earned, result.score.possible);
        for field in &result.score.fields {
            by_field
                .entry(field.field.clone())
                .or_default()
                .add(field.earned, field.possible);
        }
    }

    let timing = timing_stats(results);

    let mut by_time: Vec<&CaseResult> = results.iter().collect();
    by_time.sort_by(|a, b| b.elapsed_ms.total_cmp(&a.elapsed_ms));
    let slowest = by_time
        .into_iter()
        .take(SLOWEST_CASES)
        .map(|r| SlowCase {
            query: r.query.clone(),
            elapsed_ms: r.elapsed_ms,
        })
        .collect();

    let failed = results
        .iter()
        .filter(|r| !r.score.is_perfect())
        .map(|r| FailedCase {
            query: r.query.clone(),
            difficulty: r.difficulty,
            percent: r.score.percent(),
            mismatches: r.score.mismatches.iter().map(ToString::to_string).collect(),
        })
        .collect();

    EvaluationSummary {
        run_id,
        finished_at: Utc::now(),
        total_cases: results.len(),
        overall,
        by_difficulty,
        by_field,
        timing,
        slowest,
        failed,
    }
}

fn timing_stats(results: &[CaseResult]) -> TimingStats {
    if results.is_empty() {
        return TimingStats::default();
    }
    let total_ms: f64 = results.iter().map(|r| r.elapsed_ms).sum();
    let min_ms = results.iter().map(|r| r.elapsed_ms).fold(f64::INFINITY, f64::min);
    let max_ms = results.iter().map(|r| r.elapsed_ms).fold(0.0, f64::max);
    TimingStats {
        total_ms,
        avg_ms: total_ms / results.len() as f64,
        min_ms,
        max_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::vocabulary::Vocabulary;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn pipeline() -> Arc<QueryPipeline> {
        Arc::new(QueryPipeline::new(
            &Vocabulary::bundled().unwrap(),
            PipelineConfig::fallback_only(),
        ))
    }

    fn case(query: &str, expected: serde_json::Value, difficulty: Difficulty) -> TestCase {
        TestCase {
            query: query.into(),
            expected: expected.as_object().cloned().unwrap(),
            difficulty,
        }
    }

    fn result_with(index: usize, elapsed_ms: f64, score: CaseScore) -> CaseResult {
        CaseResult {
            index,
            query: format!("q{index}"),
            difficulty: Difficulty::Easy,
            source: ExtractionSource::Fallback,
            params: SearchParams::default(),
            score,
            elapsed_ms,
        }
    }

    #[test]
    fn bundled_cases_parse() {
        let cases = bundled_test_cases().unwrap();
        assert!(cases.len() >= 10);
    }

    #[test]
    fn load_test_cases_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(
            &path,
            r#"[{"query":"50 cartas","expected":{"limit":50},"difficulty":"easy"}]"#,
        )
        .unwrap();
        let cases = load_test_cases(&path).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].expected["limit"], 50);
    }

    #[test]
    fn load_test_cases_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_test_cases(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, EvaluationError::Load(_, _)));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"query":"x"}]"#).unwrap();
        assert!(matches!(load_test_cases(&path).unwrap_err(), EvaluationError::Parse(_, _)));
    }

    #[test]
    fn run_case_scores_fallback_output() {
        let scorer = AccuracyScorer::default();
        let c = case(
            "50 cartas ortoimg do 5cgeo em gde escala",
            json!({"productType": "Carta Ortoimagem", "supplyArea": "5° Centro de Geoinformação", "limit": 50}),
            Difficulty::Medium,
        );
        let result = run_case(&pipeline(), &scorer, 0, &c, today());
        assert!(result.score.is_perfect(), "{:?}", result.score.mismatches);
        assert_eq!(result.score.percent(), 100.0);
        assert_eq!(result.source, ExtractionSource::Fallback);
    }

    #[tokio::test]
    async fn evaluate_runs_all_cases_in_order() {
        let cases = vec![
            case("MI 2965-2-NE do segundo cgeo", json!({"supplyArea": "2° Centro de Geoinformação"}), Difficulty::Easy),
            case("cartas do rj", json!({"state": "RJ"}), Difficulty::Hard),
            case("10 cartas topo", json!({"limit": 10, "productType": "Carta Topográfica"}), Difficulty::Medium),
        ];
        let summary = evaluate(pipeline(), Arc::new(AccuracyScorer::default()), cases, today())
            .await
            .unwrap();

        assert_eq!(summary.total_cases, 3);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].query, "cartas do rj");
        assert!(summary.failed[0].mismatches[0].contains("field absent"));
        assert_eq!(summary.by_difficulty["easy"].percent(), 100.0);
        assert_eq!(summary.by_difficulty["hard"].percent(), 0.0);
        assert_eq!(summary.by_field["limit"].percent(), 100.0);
        assert!(summary.slowest.len() <= SLOWEST_CASES);
    }

    #[tokio::test]
    async fn evaluate_empty_batch() {
        let summary = evaluate(pipeline(), Arc::new(AccuracyScorer::default()), vec![], today())
            .await
            .unwrap();
        assert_eq!(summary.total_cases, 0);
        assert_eq!(summary.overall.percent(), 100.0);
        assert_eq!(summary.timing, TimingStats::default());
    }

    #[test]
    fn summarize_picks_five_slowest_stably() {
        let results: Vec<_> = [3.0, 9.0, 1.0, 9.0, 5.0, 7.0, 2.0]
            .into_iter()
            .enumerate()
            .map(|(i, ms)| result_with(i, ms, CaseScore::default()))
            .collect();
        let summary = summarize(Uuid::new_v4(), &results);
        let slow: Vec<_> = summary.slowest.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(slow, vec!["q1", "q3", "q5", "q4", "q0"]);
        assert_eq!(summary.timing.min_ms, 1.0);
        assert_eq!(summary.timing.max_ms, 9.0);
        assert_eq!(summary.timing.total_ms, 36.0);
    }
}
