pub mod config;
pub mod models;
pub mod vocabulary;
pub mod pipeline;
pub mod evaluation;
pub mod catalog;

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::evaluation::{bundled_test_cases, evaluate, load_test_cases, render_report, AccuracyScorer};
use crate::pipeline::QueryPipeline;
use crate::vocabulary::Vocabulary;

/// Evaluation CLI: `cartaquery [cases.json]`.
///
/// Runs the rule-based path over the given cases (or the bundled sample set)
/// and prints the report. Exits non-zero on load failures.
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cases_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(e) = run_evaluation(cases_path) {
        tracing::error!(error = %e, "Evaluation aborted");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run_evaluation(cases_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let vocabulary = Vocabulary::load_or_bundled(&config::resources_dir())?;
    let cases = match &cases_path {
        Some(path) => load_test_cases(path)?,
        None => bundled_test_cases()?,
    };

    let pipeline = Arc::new(QueryPipeline::new(&vocabulary, PipelineConfig::fallback_only()));
    let scorer = Arc::new(AccuracyScorer::default());
    let today = chrono::Local::now().date_naive();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let summary = runtime.block_on(evaluate(pipeline, scorer, cases, today))?;

    println!("{}", render_report(&summary));
    Ok(())
}
