//! Error types for test generation

use std::path::PathBuf;

use thiserror::Error;

use crate::service::llm::LlmError;

/// Error type for test generation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("LLM test generation failed: {0}")]
    GenerationFailed(#[from] LlmError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerationError::Io {
            path: path.into(),
            source,
        }
    }
}
