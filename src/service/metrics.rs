//! Timing and aggregate metrics for generation and classification runs

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;

use crate::model::{
    ClassificationMetrics, GenerationMetrics, MetricsSnapshot, Severity, TimerRecord,
};

const RULE: &str = "──────────────────────────────────────────────────────────────";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MetricsError {
    #[error("Failed to serialize metrics: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write metrics file: {0}")]
    Io(#[from] std::io::Error),
}

/// Collects metrics over the lifetime of a run
///
/// Only one timer runs at a time; starting a new one abandons the previous
/// span without an end timestamp.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    generation: GenerationMetrics,
    classification: ClassificationMetrics,
    started: Option<Instant>,
    timestamps: Vec<TimerRecord>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timer(&mut self, label: &str) {
        self.started = Some(Instant::now());
        self.timestamps.push(TimerRecord {
            label: label.to_string(),
            start: Utc::now(),
            end: None,
            duration: None,
        });
    }

    /// Elapsed seconds since the last `start_timer`, or 0 if none is running
    pub fn stop_timer(&mut self) -> f64 {
        let Some(started) = self.started.take() else {
            return 0.0;
        };

        let elapsed = started.elapsed().as_secs_f64();
        if let Some(record) = self.timestamps.last_mut() {
            record.end = Some(Utc::now());
            record.duration = Some(elapsed);
        }

        elapsed
    }

    pub fn record_generation(
        &mut self,
        requirements: usize,
        tests: usize,
        time_taken: f64,
        lines: usize,
        syntax_errors: usize,
    ) {
        self.generation = GenerationMetrics {
            requirements_processed: requirements,
            tests_generated: tests,
            generation_time: time_taken,
            average_time_per_test: if tests > 0 {
                time_taken / tests as f64
            } else {
                0.0
            },
            total_lines_generated: lines,
            syntax_errors,
        };
    }

    /// `accuracy` is a percentage
    pub fn record_classification(
        &mut self,
        severity_distribution: BTreeMap<Severity, usize>,
        time_taken: f64,
        accuracy: f64,
    ) {
        let mut distribution: BTreeMap<Severity, usize> =
            Severity::ALL.into_iter().map(|s| (s, 0)).collect();
        distribution.extend(severity_distribution);

        self.classification = ClassificationMetrics {
            total_classifications: distribution.values().sum(),
            severity_distribution: distribution,
            classification_time: time_taken,
            accuracy,
        };
    }

    #[cfg(test)]
    pub fn generation(&self) -> &GenerationMetrics {
        &self.generation
    }

    #[cfg(test)]
    pub fn classification(&self) -> &ClassificationMetrics {
        &self.classification
    }

    /// Current metrics with times and rates rounded to two decimals
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            test_generation: GenerationMetrics {
                generation_time: round2(self.generation.generation_time),
                average_time_per_test: round2(self.generation.average_time_per_test),
                ..self.generation.clone()
            },
            bug_classification: ClassificationMetrics {
                classification_time: round2(self.classification.classification_time),
                accuracy: round2(self.classification.accuracy),
                ..self.classification.clone()
            },
            timestamps: self.timestamps.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub async fn save(&self, path: &Path) -> Result<(), MetricsError> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), "Metrics saved");
        Ok(())
    }

    /// Human-readable summary
    pub fn generate_report(&self) -> String {
        let generation = &self.generation;
        let classification = &self.classification;
        let count = |severity: Severity| {
            classification
                .severity_distribution
                .get(&severity)
                .copied()
                .unwrap_or(0)
        };

        format!(
            r#"
╔══════════════════════════════════════════════════════════════╗
║                   COGNITEST METRICS REPORT                   ║
╚══════════════════════════════════════════════════════════════╝

TEST GENERATION METRICS
{RULE}
  Requirements:          {}
  Tests Generated:       {}
  Generation Time:       {:.2}s
  Avg Time/Test:         {:.2}s
  Lines Generated:       {}
  Syntax Errors:         {}

BUG CLASSIFICATION METRICS
{RULE}
  Total Classified:      {}
  Critical:              {}
  High:                  {}
  Medium:                {}
  Low:                   {}
  Classification Time:   {:.2}s
  Accuracy:              {:.2}%

════════════════════════════════════════════════════════════════
"#,
            generation.requirements_processed,
            generation.tests_generated,
            generation.generation_time,
            generation.average_time_per_test,
            generation.total_lines_generated,
            generation.syntax_errors,
            classification.total_classifications,
            count(Severity::Critical),
            count(Severity::High),
            count(Severity::Medium),
            count(Severity::Low),
            classification.classification_time,
            classification.accuracy,
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
