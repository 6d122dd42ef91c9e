use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Bug severity levels, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown severity label: {0}")]
pub struct UnknownSeverity(pub String);

/// Exact, case-sensitive match against the four labels
impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

/// Outcome of a single severity classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub severity: Severity,
    /// Business criticality and data integrity (0-10)
    pub impact_score: f64,
    /// How often users encounter the failure (0-10)
    pub frequency_score: f64,
    /// Difficulty of workaround or fix (0-10)
    pub recovery_score: f64,
    /// Always derived from the three scores above
    pub weighted_score: f64,
    pub reasoning: String,
}

/// History entry kept by the classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub endpoint: String,
    pub classification: ClassificationResult,
}

/// A failed-test bug report submitted for classification
///
/// Fields other than the three known ones are carried through untouched so
/// batch output can be correlated with the caller's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugReport {
    pub error_message: String,
    #[serde(default)]
    pub test_context: String,
    pub endpoint: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
impl BugReport {
    pub fn new(
        error_message: impl Into<String>,
        test_context: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            error_message: error_message.into(),
            test_context: test_context.into(),
            endpoint: endpoint.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Bug report merged with its classification (batch output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedBug {
    #[serde(flatten)]
    pub bug: BugReport,
    pub classification: ClassificationResult,
}

impl ClassifiedBug {
    /// Output key holding the classification
    pub const RESULT_KEY: &'static str = "classification";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStatistics {
    pub total_classifications: usize,
    pub severity_distribution: BTreeMap<Severity, usize>,
    pub average_weighted_score: f64,
}
