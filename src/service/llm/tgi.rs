//! Client for a Hugging Face text-generation-inference server
//!
//! Instruction-tuned Mistral models expect the prompt wrapped in
//! `[INST] ... [/INST]`; anything the server echoes before the closing tag
//! is dropped from the response.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LlmError, TextGenerator};
use crate::model::GenerationParams;

const INSTRUCTION_END: &str = "[/INST]";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    inputs: String,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u64,
    temperature: f64,
    top_p: f64,
    repetition_penalty: f64,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: String,
}

/// Text generator backed by a self-hosted TGI endpoint
pub struct TgiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl TgiClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn build_request(prompt: &str, params: &GenerationParams) -> GenerateRequest {
        GenerateRequest {
            inputs: format_instruction(prompt),
            parameters: GenerateParameters {
                max_new_tokens: params.max_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                repetition_penalty: params.repetition_penalty,
                do_sample: true,
                return_full_text: false,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for TgiClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let url = format!("{}/generate", self.base_url);
        let body = Self::build_request(prompt, params);

        tracing::debug!(
            url = %url,
            model = %self.model,
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "Sending generation request"
        );

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to deserialize generation: {}", e)))?;

        Ok(extract_response(&generated.generated_text))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn format_instruction(prompt: &str) -> String {
    format!("[INST] {} {}", prompt, INSTRUCTION_END)
}

/// Keep only the text after the last instruction terminator
fn extract_response(text: &str) -> String {
    match text.rsplit_once(INSTRUCTION_END) {
        Some((_, response)) => response.trim().to_string(),
        None => text.trim().to_string(),
    }
}
