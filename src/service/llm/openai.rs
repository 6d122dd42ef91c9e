//! OpenAI-backed text generation via rig

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use super::{LlmError, TextGenerator};
use crate::model::GenerationParams;

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str, model: &str) -> Result<Self, LlmError> {
        let client = openai::Client::new(api_key).map_err(|e| {
            LlmError::NotConfigured(format!("Failed to create OpenAI client: {}", e))
        })?;

        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    /// Repetition penalty has no chat-completions equivalent and is not forwarded
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(&self.model)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .additional_params(serde_json::json!({ "top_p": params.top_p }))
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::CompletionFailed(e.to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
