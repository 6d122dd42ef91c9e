//! Error types for bug classification

use thiserror::Error;

use crate::service::llm::LlmError;

/// Error type for bug classification
///
/// Malformed model output is never an error; only the generation call can fail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassificationError {
    #[error("LLM classification failed: {0}")]
    ClassificationFailed(#[from] LlmError),
}
