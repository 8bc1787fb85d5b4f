pub mod types;
pub mod states;
pub mod scorer;
pub mod runner;
pub mod report;

pub use types::*;
pub use scorer::*;
pub use runner::*;
pub use report::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Failed to read test cases from {0}: {1}")]
    Load(String, String),

    #[error("Failed to parse test cases from {0}: {1}")]
    Parse(String, String),

    #[error("Evaluation task failed: {0}")]
    Task(String),
}
