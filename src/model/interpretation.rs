use serde::{Deserialize, Serialize};

/// Root-cause analysis of an error log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpretationResult {
    pub root_cause: String,
    pub affected_components: String,
    pub recommended_fix: String,
    pub prevention: String,
    /// Unparsed model output, kept for auditability
    pub raw_response: String,
    pub service_name: String,
    /// First 500 characters of the log that was interpreted
    pub original_log: String,
}

/// History entry kept by the interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretationRecord {
    pub service: String,
    pub interpretation: InterpretationResult,
}

/// An error log submitted for interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub error_log: String,
    pub service_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
impl LogEntry {
    pub fn new(error_log: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            error_log: error_log.into(),
            service_name: service_name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Log entry merged with its interpretation (batch output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretedLog {
    #[serde(flatten)]
    pub entry: LogEntry,
    pub interpretation: InterpretationResult,
}

impl InterpretedLog {
    /// Output key holding the interpretation
    pub const RESULT_KEY: &'static str = "interpretation";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpretationStatistics {
    pub total_interpretations: usize,
    pub services_analyzed: Vec<String>,
    pub unique_services: usize,
}
