use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::models::SearchParams;
use crate::vocabulary::Vocabulary;

use super::canonicalize::TermCanonicalizer;
use super::fallback::FallbackExtractor;
use super::llm::LlmClient;
use super::prompt::build_system_prompt;
use super::validation::{validate_fields, validate_llm_output};

/// Which path produced the params.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Llm,
    Fallback,
}

/// Result of interpreting one query.
#[derive(Debug, Clone, Serialize)]
pub struct Interpretation {
    pub params: SearchParams,
    pub source: ExtractionSource,
    pub canonical_query: String,
    pub warnings: Vec<String>,
}

/// Query text → validated SearchParams.
///
/// Stateless per call; the alias tables are built once and shared.
pub struct QueryPipeline {
    canonicalizer: TermCanonicalizer,
    fallback: FallbackExtractor,
    llm: Option<Arc<dyn LlmClient>>,
    config: PipelineConfig,
}

impl QueryPipeline {
    pub fn new(vocabulary: &Vocabulary, config: PipelineConfig) -> Self {
        Self {
            canonicalizer: TermCanonicalizer::new(&vocabulary.term_aliases),
            fallback: FallbackExtractor::new(&vocabulary.project_aliases),
            llm: None,
            config,
        }
    }

    pub fn with_llm(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(client);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Canonicalize, try the LLM when configured, fall back to rules on any failure.
    pub fn interpret(&self, query: &str, today: NaiveDate) -> Interpretation {
        let canonical_query = self.canonicalizer.canonicalize(query);

        if let Some(client) = self.llm.as_ref().filter(|_| self.config.llm_enabled) {
            let system = build_system_prompt(today);
            let attempt = client
                .generate(&self.config.model_name, &canonical_query, &system)
                .and_then(|raw| validate_llm_output(&raw));
            match attempt {
                Ok(outcome) => {
                    return Interpretation {
                        params: outcome.params,
                        source: ExtractionSource::Llm,
                        canonical_query,
                        warnings: outcome.warnings,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        code = e.code(),
                        error = %e,
                        "LLM extraction failed, using rule-based fallback"
                    );
                }
            }
        }

        let candidate = self.fallback.extract(&canonical_query, today);
        let outcome = validate_fields(&candidate);
        Interpretation {
            params: outcome.params,
            source: ExtractionSource::Fallback,
            canonical_query,
            warnings: outcome.warnings,
        }
    }
}
