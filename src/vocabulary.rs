//! Alias dictionaries loaded once at startup and shared read-only.
//!
//! Both dictionaries are ordered lists: the canonicalizer and the project
//! matcher resolve overlaps by list position, so they are kept as JSON arrays
//! and never collected into a map.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::normalize::fold;

pub const TERM_ALIASES_FILE: &str = "term_aliases.json";
pub const PROJECT_ALIASES_FILE: &str = "project_aliases.json";

const BUNDLED_TERM_ALIASES: &str = include_str!("../resources/term_aliases.json");
const BUNDLED_PROJECT_ALIASES: &str = include_str!("../resources/project_aliases.json");

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Failed to read {0}: {1}")]
    Load(String, String),

    #[error("Failed to parse {0}: {1}")]
    Parse(String, String),

    #[error("{file} entry {index} has an empty alias or canonical form")]
    EmptyEntry { file: String, index: usize },
}

/// One alias → canonical substitution. Many aliases may share a canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMapping {
    pub alias: String,
    pub canonical: String,
}

impl TermMapping {
    pub fn new(alias: &str, canonical: &str) -> Self {
        Self {
            alias: alias.to_string(),
            canonical: canonical.to_string(),
        }
    }
}

/// Loaded alias dictionaries.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub term_aliases: Vec<TermMapping>,
    pub project_aliases: Vec<TermMapping>,
}

impl Vocabulary {
    /// Load both dictionaries from a resources directory.
    pub fn load(resources_dir: &Path) -> Result<Self, VocabularyError> {
        let term_aliases = load_file(&resources_dir.join(TERM_ALIASES_FILE))?;
        let project_aliases = load_file(&resources_dir.join(PROJECT_ALIASES_FILE))?;

        Ok(Self {
            term_aliases,
            project_aliases,
        })
    }

    /// Dictionaries compiled into the binary.
    pub fn bundled() -> Result<Self, VocabularyError> {
        Ok(Self {
            term_aliases: parse_mappings(TERM_ALIASES_FILE, BUNDLED_TERM_ALIASES)?,
            project_aliases: parse_mappings(PROJECT_ALIASES_FILE, BUNDLED_PROJECT_ALIASES)?,
        })
    }

    /// Load from `resources_dir` when it holds a term dictionary, else use the bundled copies.
    pub fn load_or_bundled(resources_dir: &Path) -> Result<Self, VocabularyError> {
        if resources_dir.join(TERM_ALIASES_FILE).is_file() {
            tracing::info!(dir = %resources_dir.display(), "Loading vocabulary from resources directory");
            Self::load(resources_dir)
        } else {
            tracing::debug!("No resources directory found, using bundled vocabulary");
            Self::bundled()
        }
    }

    /// Create a small vocabulary for tests (no file I/O).
    pub fn load_test() -> Self {
        Self {
            term_aliases: vec![
                TermMapping::new("segundo cgeo", "2° Centro de Geoinformação"),
                TermMapping::new("5cgeo", "5° Centro de Geoinformação"),
                TermMapping::new("25k", "1:25.000"),
                TermMapping::new("ortoimg", "Ortoimagem"),
                TermMapping::new("gde escala", "grande escala"),
                TermMapping::new("rj", "Rio de Janeiro"),
            ],
            project_aliases: vec![
                TermMapping::new("radiografia da amazonia", "Radiografia da Amazônia"),
                TermMapping::new("amazonia", "Cartografia da Amazônia"),
                TermMapping::new("copa do mundo", "Copa do Mundo 2014"),
            ],
        }
    }
}

fn load_file(path: &Path) -> Result<Vec<TermMapping>, VocabularyError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| VocabularyError::Load(path.display().to_string(), e.to_string()))?;
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_mappings(&file, &json)
}

fn parse_mappings(file: &str, json: &str) -> Result<Vec<TermMapping>, VocabularyError> {
    let mappings: Vec<TermMapping> = serde_json::from_str(json)
        .map_err(|e| VocabularyError::Parse(file.to_string(), e.to_string()))?;

    if let Some(index) = mappings
        .iter()
        .position(|m| fold(m.alias.trim()).is_empty() || m.canonical.trim().is_empty())
    {
        return Err(VocabularyError::EmptyEntry {
            file: file.to_string(),
            index,
        });
    }

    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClosedDomain, Project};

    #[test]
    fn bundled_dictionaries_parse() {
        let vocab = Vocabulary::bundled().unwrap();
        assert!(vocab.term_aliases.len() > 100);
        assert!(!vocab.project_aliases.is_empty());
    }

    #[test]
    fn bundled_project_aliases_target_known_projects() {
        let vocab = Vocabulary::bundled().unwrap();
        for mapping in &vocab.project_aliases {
            assert!(
                Project::members().iter().any(|p| p.label() == mapping.canonical),
                "unknown project target {}",
                mapping.canonical
            );
        }
    }

    #[test]
    fn load_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TERM_ALIASES_FILE),
            r#"[{"alias":"topo","canonical":"Topográfica"}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(PROJECT_ALIASES_FILE), "[]").unwrap();

        let vocab = Vocabulary::load(dir.path()).unwrap();
        assert_eq!(vocab.term_aliases, vec![TermMapping::new("topo", "Topográfica")]);
        assert!(vocab.project_aliases.is_empty());
    }

    #[test]
    fn load_or_bundled_falls_back_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = Vocabulary::load_or_bundled(dir.path()).unwrap();
        assert!(vocab.term_aliases.len() > 100);
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vocabulary::load(dir.path()).unwrap_err();
        assert!(matches!(err, VocabularyError::Load(_, _)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TERM_ALIASES_FILE), "{not json").unwrap();
        std::fs::write(dir.path().join(PROJECT_ALIASES_FILE), "[]").unwrap();
        let err = Vocabulary::load(dir.path()).unwrap_err();
        assert!(matches!(err, VocabularyError::Parse(ref f, _) if f == TERM_ALIASES_FILE));
    }

    #[test]
    fn empty_alias_is_rejected() {
        let err = parse_mappings("x.json", r#"[{"alias":"ok","canonical":"Ok"},{"alias":"  ","canonical":"X"}]"#)
            .unwrap_err();
        assert!(matches!(err, VocabularyError::EmptyEntry { index: 1, .. }));
    }
}
