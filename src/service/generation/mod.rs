//! Pytest generation from natural-language requirements using LLM

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::model::{GeneratedTest, GenerationParams, GenerationStatistics};
use crate::service::generation::cleanup::{attempt_fix, clean_generated_code, is_structurally_valid};
use crate::service::generation::prompts::{build_edge_case_prompt, build_test_generation_prompt};
use crate::service::generation::requirements::parse_requirements;
use crate::service::llm::TextGenerator;

const GENERATION_TEMPERATURE: f64 = 0.3;

pub mod cleanup;
pub mod error;
pub mod prompts;
pub mod requirements;

pub use error::GenerationError;

/// Generates pytest suites and remembers everything it produced
pub struct TestGenerator {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    generated: Vec<GeneratedTest>,
    syntax_errors: usize,
}

impl TestGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, params: &GenerationParams) -> Self {
        Self {
            generator,
            params: params.with_temperature(GENERATION_TEMPERATURE),
            generated: Vec::new(),
            syntax_errors: 0,
        }
    }

    /// Generate a test module for one requirement, optionally saving it
    pub async fn generate_from_requirement(
        &mut self,
        requirement: &str,
        api_endpoint: &str,
        http_method: &str,
        output_file: Option<&Path>,
    ) -> Result<String, GenerationError> {
        let start_time = std::time::Instant::now();
        let preview: String = requirement.trim().chars().take(50).collect();
        tracing::info!(endpoint = %api_endpoint, requirement = %preview, "Generating tests");

        let prompt = build_test_generation_prompt(requirement, api_endpoint, http_method);
        let raw = self.generator.generate(&prompt, &self.params).await?;

        let mut code = clean_generated_code(&raw);
        if !is_structurally_valid(&code) {
            tracing::warn!(
                endpoint = %api_endpoint,
                "Generated code failed structural check, attempting to fix"
            );
            self.syntax_errors += 1;
            code = attempt_fix(&code);
        }

        if let Some(path) = output_file {
            save_test_file(&code, path).await?;
        }

        self.generated.push(GeneratedTest {
            requirement: requirement.to_string(),
            endpoint: api_endpoint.to_string(),
            code: code.clone(),
        });

        tracing::info!(
            endpoint = %api_endpoint,
            lines = code.split('\n').count(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Test generation completed"
        );

        Ok(code)
    }

    /// Generate one test file per requirement block in `requirements_file`
    ///
    /// Files are named `test_generated_{n}_{name}.py`, numbered from 1.
    pub async fn generate_from_requirements_file(
        &mut self,
        requirements_file: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, GenerationError> {
        tracing::info!(path = %requirements_file.display(), "Reading requirements");

        let content = tokio::fs::read_to_string(requirements_file)
            .await
            .map_err(|e| GenerationError::io(requirements_file, e))?;
        let requirements = parse_requirements(&content);

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| GenerationError::io(output_dir, e))?;

        let mut generated_files = Vec::with_capacity(requirements.len());
        for (idx, requirement) in requirements.iter().enumerate() {
            let output_file =
                output_dir.join(format!("test_generated_{}_{}.py", idx + 1, requirement.name));

            self.generate_from_requirement(
                &requirement.description,
                &requirement.endpoint,
                &requirement.method,
                Some(&output_file),
            )
            .await?;

            generated_files.push(output_file);
        }

        tracing::info!(count = generated_files.len(), "Generated test files");
        Ok(generated_files)
    }

    /// Ask the model for edge cases of a function specification
    ///
    /// The answer is free text and is returned as-is.
    pub async fn suggest_edge_cases(&self, function_spec: &str) -> Result<String, GenerationError> {
        let prompt = build_edge_case_prompt(function_spec);
        Ok(self.generator.generate(&prompt, &self.params).await?)
    }

    #[cfg(test)]
    pub fn generated_tests(&self) -> &[GeneratedTest] {
        &self.generated
    }

    /// Generations that needed the indentation fix
    pub fn syntax_errors(&self) -> usize {
        self.syntax_errors
    }

    pub fn statistics(&self) -> GenerationStatistics {
        let total_tests = self.generated.len();
        let total_lines: usize = self.generated.iter().map(GeneratedTest::line_count).sum();

        GenerationStatistics {
            total_tests,
            total_lines,
            average_lines_per_test: if total_tests == 0 {
                0.0
            } else {
                total_lines as f64 / total_tests as f64
            },
        }
    }
}

async fn save_test_file(code: &str, path: &Path) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GenerationError::io(parent, e))?;
    }

    tokio::fs::write(path, code)
        .await
        .map_err(|e| GenerationError::io(path, e))?;

    tracing::info!(path = %path.display(), "Test file saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::testing::ScriptedGenerator;

    const GENERATED: &str = "```python\ndef test_register():\n    r = requests.post('http://localhost:8000/api/users/register', json={})\n    assert r.status_code == 422\n```";

    fn test_generator(generator: &Arc<ScriptedGenerator>) -> TestGenerator {
        TestGenerator::new(generator.clone(), &GenerationParams::default())
    }

    #[tokio::test]
    async fn test_generate_cleans_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("test_register.py");
        let generator = Arc::new(ScriptedGenerator::new([GENERATED]));
        let mut test_generator = test_generator(&generator);

        let code = test_generator
            .generate_from_requirement(
                "Users must register with a valid email",
                "http://localhost:8000/api/users/register",
                "POST",
                Some(&output),
            )
            .await
            .unwrap();

        assert!(code.starts_with("import pytest\nimport requests\ndef test_register():"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), code);
        assert_eq!(test_generator.syntax_errors(), 0);
        assert_eq!(generator.calls()[0].1.temperature, 0.3);

        let stats = test_generator.statistics();
        assert_eq!(stats.total_tests, 1);
        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.average_lines_per_test, 5.0);
    }

    #[tokio::test]
    async fn test_broken_code_is_counted_and_fixed() {
        let generator = Arc::new(ScriptedGenerator::new([
            "import pytest\n  def test_a(:\n    assert True",
        ]));
        let mut test_generator = test_generator(&generator);

        let code = test_generator
            .generate_from_requirement("r", "/api", "GET", None)
            .await
            .unwrap();

        assert_eq!(test_generator.syntax_errors(), 1);
        assert_eq!(code, "import pytest\ndef test_a(:\n    assert True");
    }

    #[tokio::test]
    async fn test_generate_from_requirements_file() {
        let dir = tempfile::tempdir().unwrap();
        let requirements = dir.path().join("requirements.txt");
        std::fs::write(
            &requirements,
            "[User Login]\nEndpoint: /api/users/login\nMethod: POST\nDescription: Login returns a JWT.\n---\n[Create Order]\nEndpoint: /api/orders\nDescription: Quantity between 1 and 1000.\n",
        )
        .unwrap();
        let output_dir = dir.path().join("generated");

        let generator = Arc::new(ScriptedGenerator::new([
            "def test_login():\n    pass",
            "def test_order():\n    pass",
        ]));
        let mut test_generator = test_generator(&generator);

        let files = test_generator
            .generate_from_requirements_file(&requirements, &output_dir)
            .await
            .unwrap();

        assert_eq!(
            files,
            vec![
                output_dir.join("test_generated_1_user_login.py"),
                output_dir.join("test_generated_2_create_order.py"),
            ]
        );
        assert!(files.iter().all(|f| f.exists()));
        assert!(generator.calls()[1].0.contains("Quantity between 1 and 1000."));
        assert_eq!(test_generator.generated_tests().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_requirements_file_is_io_error() {
        let generator = Arc::new(ScriptedGenerator::default());
        let mut test_generator = test_generator(&generator);

        let result = test_generator
            .generate_from_requirements_file(Path::new("/nonexistent/reqs.txt"), Path::new("out"))
            .await;

        assert!(matches!(result, Err(GenerationError::Io { .. })));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_edge_cases_returns_raw_text() {
        let generator = Arc::new(ScriptedGenerator::new(["1. Empty amount\n2. Negative amount"]));
        let test_generator = test_generator(&generator);

        let text = test_generator
            .suggest_edge_cases("def pay(amount: float)")
            .await
            .unwrap();

        assert_eq!(text, "1. Empty amount\n2. Negative amount");
        assert!(test_generator.generated_tests().is_empty());
    }

    #[test]
    fn test_statistics_empty() {
        let generator = Arc::new(ScriptedGenerator::default());
        let stats = test_generator(&generator).statistics();
        assert_eq!(stats, GenerationStatistics::default());
    }
}
