use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_CONFIG_PATH: &str = "COGNITEST_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "cognitest.yaml";

const ENV_LLM_BACKEND: &str = "LLM_BACKEND";
const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
const ENV_LLM_MODEL: &str = "LLM_MODEL";
const ENV_RESULTS_DIR: &str = "RESULTS_DIR";

pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_RESULTS_DIR: &str = "data/results";

/// Sampling parameters forwarded to the text generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f64,
    /// Nucleus-sampling threshold
    pub top_p: f64,
    pub max_tokens: u64,
    pub repetition_penalty: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.85,
            max_tokens: 2048,
            repetition_penalty: 1.15,
        }
    }
}

impl GenerationParams {
    /// Same parameters with a different sampling temperature
    pub fn with_temperature(&self, temperature: f64) -> Self {
        Self {
            temperature,
            ..self.clone()
        }
    }
}

/// Which text generation service to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackend {
    /// Hugging Face text-generation-inference server
    #[default]
    Tgi,
    /// OpenAI chat completions
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
}

impl LlmBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "tgi" => Some(LlmBackend::Tgi),
            "openai" => Some(LlmBackend::OpenAi),
            _ => None,
        }
    }
}

/// Description of the text generator in use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub backend: LlmBackend,
    pub model_name: String,
    /// Only set for self-hosted backends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub generation: GenerationParams,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub backend: Option<LlmBackend>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub generation: GenerationParams,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: LlmBackend,
    pub base_url: String,
    pub model: String,
    pub generation: GenerationParams,
    pub results_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationParams::default(),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    ///
    /// Environment variables take precedence over the file.
    pub fn from_env() -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let backend = match std::env::var(ENV_LLM_BACKEND) {
            Ok(value) => LlmBackend::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "Unknown LLM backend, falling back to tgi");
                LlmBackend::Tgi
            }),
            Err(_) => file.backend.unwrap_or_default(),
        };

        let base_url = std::env::var(ENV_LLM_BASE_URL)
            .ok()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = std::env::var(ENV_LLM_MODEL)
            .ok()
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let results_dir = std::env::var(ENV_RESULTS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_DIR));

        Self {
            backend,
            base_url,
            model,
            generation: file.generation,
            results_dir,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(path, &contents),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(path: &Path, contents: &str) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }
}
