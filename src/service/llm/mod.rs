//! Shared text generation client and interaction utilities
//!
//! Every service talks to the model through [`TextGenerator`], a single
//! "generate text from prompt" call. Responses are unstructured text; any
//! structure is recovered by the calling service.

mod openai;
mod tgi;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{Config, GenerationParams, LlmBackend};

pub use self::openai::LlmClient;
pub use self::tgi::TgiClient;

/// Environment variable for OpenAI API key
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("LLM client not configured: {0}")]
    NotConfigured(String),

    #[error("Completion failed: {0}")]
    CompletionFailed(String),
}

/// A model-serving component that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` using the given sampling parameters
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError>;

    /// Identifier of the model behind this generator
    fn model_name(&self) -> &str;
}

/// Build the generator selected by configuration
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let generator: Arc<dyn TextGenerator> = match config.backend {
        LlmBackend::Tgi => Arc::new(TgiClient::new(&config.base_url, &config.model)),
        LlmBackend::OpenAi => {
            let api_key = std::env::var(ENV_OPENAI_API_KEY)
                .map_err(|_| LlmError::NotConfigured(format!("missing {ENV_OPENAI_API_KEY}")))?;
            Arc::new(LlmClient::new(&api_key, &config.model)?)
        }
    };

    tracing::info!(
        backend = ?config.backend,
        model = %generator.model_name(),
        "Text generator initialized"
    );

    Ok(generator)
}
