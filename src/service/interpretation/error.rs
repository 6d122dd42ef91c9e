//! Error types for log interpretation

use thiserror::Error;

use crate::service::llm::LlmError;

/// Error type for log interpretation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InterpretationError {
    #[error("LLM interpretation failed: {0}")]
    InterpretationFailed(#[from] LlmError),
}
