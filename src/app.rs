//! Application state and service initialization
//!
//! All services share one text generator built from configuration.

use std::sync::Arc;

use crate::model::{Config, LlmBackend, ModelInfo};
use crate::service::llm::build_generator;
use crate::service::{BugClassifier, LlmError, LogInterpreter, TestGenerator, TextGenerator};

/// Configuration plus the shared text generator
pub struct AppState {
    pub config: Config,
    generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Build the text generator selected by `config`
    pub fn new(config: Config) -> Result<Self, AppError> {
        let generator = build_generator(&config).map_err(|e| match e {
            LlmError::NotConfigured(what) => AppError::InvalidConfig(what),
            other => AppError::GeneratorInit(other),
        })?;

        Ok(Self { config, generator })
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            backend: self.config.backend,
            model_name: self.generator.model_name().to_string(),
            base_url: match self.config.backend {
                LlmBackend::Tgi => Some(self.config.base_url.clone()),
                LlmBackend::OpenAi => None,
            },
            generation: self.config.generation.clone(),
        }
    }

    pub fn classifier(&self) -> BugClassifier {
        BugClassifier::new(Arc::clone(&self.generator), &self.config.generation)
    }

    pub fn interpreter(&self) -> LogInterpreter {
        LogInterpreter::new(Arc::clone(&self.generator), &self.config.generation)
    }

    pub fn test_generator(&self) -> TestGenerator {
        TestGenerator::new(Arc::clone(&self.generator), &self.config.generation)
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing or unusable configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to initialize text generator: {0}")]
    GeneratorInit(#[source] LlmError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GenerationParams;

    #[test]
    fn test_tgi_backend_needs_no_credentials() {
        let state = AppState::new(Config::default()).unwrap();
        assert_eq!(state.config.backend, LlmBackend::Tgi);
        assert_eq!(state.classifier().history().len(), 0);
    }

    #[test]
    fn test_model_info_describes_tgi_backend() {
        let config = Config {
            base_url: "http://tgi.internal:8080".to_string(),
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            ..Config::default()
        };
        let info = AppState::new(config).unwrap().model_info();

        assert_eq!(info.backend, LlmBackend::Tgi);
        assert_eq!(info.model_name, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(info.base_url.as_deref(), Some("http://tgi.internal:8080"));
        assert_eq!(info.generation, GenerationParams::default());

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["backend"], "tgi");
        assert_eq!(json["generation"]["max_tokens"], 2048);
    }
}
