use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Cartaquery";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that points at an alternate resources directory.
pub const RESOURCES_DIR_ENV: &str = "CARTAQUERY_RESOURCES_DIR";

/// Default model tag handed to the LLM collaborator.
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "cartaquery_lib=info,cartaquery=info,warn"
}

/// Get the application data directory (~/.cartaquery/).
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cartaquery")
}

/// Directory holding user-supplied alias dictionaries.
///
/// `CARTAQUERY_RESOURCES_DIR` wins; otherwise `~/.cartaquery/resources`.
/// Callers fall back to the bundled dictionaries when the directory is absent.
pub fn resources_dir() -> PathBuf {
    match std::env::var_os(RESOURCES_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => app_data_dir().join("resources"),
    }
}

/// Runtime knobs for the interpretation pipeline and the evaluation runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Model tag passed to the LLM collaborator.
    pub model_name: String,
    /// When false the pipeline skips the LLM even if a client is attached.
    pub llm_enabled: bool,
    /// Upper bound on test cases evaluated at the same time.
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            llm_enabled: true,
            max_concurrency: 8,
        }
    }
}

impl PipelineConfig {
    /// Configuration for rule-only runs (no LLM collaborator).
    pub fn fallback_only() -> Self {
        Self {
            llm_enabled: false,
            ..Self::default()
        }
    }
}
