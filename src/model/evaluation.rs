use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BugReport, Severity};

/// Bug report with an expert-assigned severity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledBug {
    pub id: u64,
    #[serde(flatten)]
    pub report: BugReport,
    pub ground_truth: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedAverages {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Precision/recall/F1 per severity plus overall accuracy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub per_class: BTreeMap<Severity, ClassMetrics>,
    pub weighted_avg: WeightedAverages,
    pub overall_accuracy: f64,
}

/// One row of the classification experiment output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentOutcome {
    pub bug_id: u64,
    pub endpoint: String,
    pub predicted: Severity,
    pub ground_truth: Severity,
    pub correct: bool,
    pub weighted_score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub total_bugs: usize,
    pub classification_time_seconds: f64,
    pub overall_accuracy: f64,
    pub severity_distribution: BTreeMap<Severity, usize>,
    pub per_class_metrics: BTreeMap<Severity, ClassMetrics>,
    pub weighted_averages: WeightedAverages,
    pub detailed_results: Vec<ExperimentOutcome>,
}

/// A labelled timing span recorded by the metrics collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub label: String,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Seconds between start and end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub requirements_processed: usize,
    pub tests_generated: usize,
    pub generation_time: f64,
    pub average_time_per_test: f64,
    pub total_lines_generated: usize,
    pub syntax_errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub total_classifications: usize,
    pub severity_distribution: BTreeMap<Severity, usize>,
    pub classification_time: f64,
    /// Percentage in [0, 100]
    pub accuracy: f64,
}

/// Everything the metrics collector knows, as written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub test_generation: GenerationMetrics,
    pub bug_classification: ClassificationMetrics,
    pub timestamps: Vec<TimerRecord>,
}
