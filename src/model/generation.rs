use serde::{Deserialize, Serialize};

pub const DEFAULT_HTTP_METHOD: &str = "POST";

/// A natural-language requirement to generate tests for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Snake-case identifier used in generated file names
    pub name: String,
    pub endpoint: String,
    pub method: String,
    pub description: String,
}

impl Default for Requirement {
    fn default() -> Self {
        Self {
            name: String::new(),
            endpoint: String::new(),
            method: DEFAULT_HTTP_METHOD.to_string(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub requirement: String,
    pub endpoint: String,
    pub code: String,
}

impl GeneratedTest {
    pub fn line_count(&self) -> usize {
        self.code.split('\n').count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatistics {
    pub total_tests: usize,
    pub total_lines: usize,
    pub average_lines_per_test: f64,
}
