//! Accuracy evaluation of the severity classifier against labelled bugs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::model::{
    AccuracyReport, ClassMetrics, ExperimentOutcome, ExperimentReport, LabeledBug, Severity,
    WeightedAverages,
};
use crate::service::classification::BugClassifier;
use crate::service::metrics::{MetricsCollector, MetricsError};

pub const EXPERIMENT_FILE: &str = "classification_experiment.json";
pub const METRICS_FILE: &str = "classification_metrics.json";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid labelled dataset: {0}")]
    InvalidDataset(#[source] serde_json::Error),

    #[error("Failed to serialize experiment results: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-class precision, recall and F1 with support-weighted averages
///
/// Pairs are zipped, so surplus entries in the longer slice are ignored.
/// Per-class figures are rounded to three decimals and the weighted averages
/// are computed from those rounded values.
pub fn accuracy_report(predictions: &[Severity], ground_truth: &[Severity]) -> AccuracyReport {
    let mut true_positives: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut false_positives: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut false_negatives: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut correct = 0;
    let mut total = 0;

    for (&predicted, &truth) in predictions.iter().zip(ground_truth) {
        total += 1;
        if predicted == truth {
            correct += 1;
            *true_positives.entry(predicted).or_default() += 1;
        } else {
            *false_positives.entry(predicted).or_default() += 1;
            *false_negatives.entry(truth).or_default() += 1;
        }
    }

    let count = |map: &BTreeMap<Severity, usize>, severity: Severity| {
        map.get(&severity).copied().unwrap_or(0)
    };

    let per_class: BTreeMap<Severity, ClassMetrics> = Severity::ALL
        .into_iter()
        .map(|severity| {
            let tp = count(&true_positives, severity);
            let fp = count(&false_positives, severity);
            let fn_ = count(&false_negatives, severity);

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let f1_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            let metrics = ClassMetrics {
                precision: round3(precision),
                recall: round3(recall),
                f1_score: round3(f1_score),
                support: tp + fn_,
            };
            (severity, metrics)
        })
        .collect();

    let total_support: usize = per_class.values().map(|m| m.support).sum();
    let weighted = |value: fn(&ClassMetrics) -> f64| {
        if total_support == 0 {
            return 0.0;
        }
        let sum: f64 = per_class
            .values()
            .map(|m| value(m) * m.support as f64)
            .sum();
        round3(sum / total_support as f64)
    };

    let weighted_avg = WeightedAverages {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1_score: weighted(|m| m.f1_score),
    };

    AccuracyReport {
        per_class,
        weighted_avg,
        overall_accuracy: round3(ratio(correct, total)),
    }
}

pub async fn load_labeled_bugs(path: &Path) -> Result<Vec<LabeledBug>, EvaluationError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EvaluationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(EvaluationError::InvalidDataset)
}

/// Classify every labelled bug and score the predictions
///
/// A bug whose classification fails is logged and left out of the metrics.
/// `total_bugs` still counts every input.
pub async fn run_classification_experiment(
    classifier: &mut BugClassifier,
    bugs: &[LabeledBug],
    metrics: &mut MetricsCollector,
) -> ExperimentReport {
    tracing::info!(bugs = bugs.len(), "Starting classification experiment");

    let mut predictions = Vec::with_capacity(bugs.len());
    let mut truths = Vec::with_capacity(bugs.len());
    let mut detailed_results = Vec::with_capacity(bugs.len());

    metrics.start_timer("bug_classification");

    for (idx, bug) in bugs.iter().enumerate() {
        tracing::info!(
            index = idx + 1,
            total = bugs.len(),
            bug_id = bug.id,
            "Classifying bug"
        );

        let report = &bug.report;
        let classification = match classifier
            .classify(&report.error_message, &report.test_context, &report.endpoint)
            .await
        {
            Ok(classification) => classification,
            Err(e) => {
                tracing::error!(bug_id = bug.id, error = %e, "Classification failed, skipping bug");
                continue;
            }
        };

        let correct = classification.severity == bug.ground_truth;
        tracing::info!(
            bug_id = bug.id,
            predicted = %classification.severity,
            ground_truth = %bug.ground_truth,
            correct,
            "Bug classified"
        );

        predictions.push(classification.severity);
        truths.push(bug.ground_truth);
        detailed_results.push(ExperimentOutcome {
            bug_id: bug.id,
            endpoint: report.endpoint.clone(),
            predicted: classification.severity,
            ground_truth: bug.ground_truth,
            correct,
            weighted_score: classification.weighted_score,
            reasoning: classification.reasoning,
        });
    }

    let classification_time = metrics.stop_timer();
    let accuracy = accuracy_report(&predictions, &truths);

    let mut severity_distribution: BTreeMap<Severity, usize> =
        Severity::ALL.into_iter().map(|s| (s, 0)).collect();
    for severity in &predictions {
        *severity_distribution.entry(*severity).or_default() += 1;
    }

    metrics.record_classification(
        severity_distribution.clone(),
        classification_time,
        accuracy.overall_accuracy * 100.0,
    );

    tracing::info!(
        overall_accuracy = accuracy.overall_accuracy,
        elapsed_secs = classification_time,
        "Classification experiment completed"
    );

    ExperimentReport {
        total_bugs: bugs.len(),
        classification_time_seconds: classification_time,
        overall_accuracy: accuracy.overall_accuracy,
        severity_distribution,
        per_class_metrics: accuracy.per_class,
        weighted_averages: accuracy.weighted_avg,
        detailed_results,
    }
}

/// Write the experiment report and collected metrics into `results_dir`
///
/// Returns the paths of the experiment and metrics files.
pub async fn save_experiment(
    report: &ExperimentReport,
    metrics: &MetricsCollector,
    results_dir: &Path,
) -> Result<(PathBuf, PathBuf), EvaluationError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| EvaluationError::Io { path, source }
    };

    tokio::fs::create_dir_all(results_dir)
        .await
        .map_err(io_error(results_dir))?;

    let experiment_path = results_dir.join(EXPERIMENT_FILE);
    let json = serde_json::to_string_pretty(report).map_err(EvaluationError::Serialize)?;
    tokio::fs::write(&experiment_path, json)
        .await
        .map_err(io_error(&experiment_path))?;

    let metrics_path = results_dir.join(METRICS_FILE);
    metrics.save(&metrics_path).await?;

    tracing::info!(path = %experiment_path.display(), "Experiment results saved");
    Ok((experiment_path, metrics_path))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{BugReport, GenerationParams};
    use crate::service::llm::testing::ScriptedGenerator;

    use Severity::*;

    #[test]
    fn test_perfect_predictions() {
        let labels = [Critical, High, Medium, Low];
        let report = accuracy_report(&labels, &labels);

        assert_eq!(report.overall_accuracy, 1.0);
        for metrics in report.per_class.values() {
            assert_eq!(metrics.precision, 1.0);
            assert_eq!(metrics.recall, 1.0);
            assert_eq!(metrics.f1_score, 1.0);
            assert_eq!(metrics.support, 1);
        }
        assert_eq!(
            report.weighted_avg,
            WeightedAverages {
                precision: 1.0,
                recall: 1.0,
                f1_score: 1.0
            }
        );
    }

    #[test]
    fn test_hand_checked_metrics() {
        // Critical: tp=1 fp=1 fn=1; High: tp=1 fp=0 fn=1; Medium: tp=1 fp=1 fn=0
        let predictions = [Critical, Critical, High, Medium, Medium];
        let truth = [Critical, High, High, Medium, Critical];
        let report = accuracy_report(&predictions, &truth);

        let critical = &report.per_class[&Critical];
        assert_eq!(critical.precision, 0.5);
        assert_eq!(critical.recall, 0.5);
        assert_eq!(critical.f1_score, 0.5);
        assert_eq!(critical.support, 2);

        let high = &report.per_class[&High];
        assert_eq!(high.precision, 1.0);
        assert_eq!(high.recall, 0.5);
        assert_eq!(high.f1_score, 0.667);
        assert_eq!(high.support, 2);

        let medium = &report.per_class[&Medium];
        assert_eq!(medium.precision, 0.5);
        assert_eq!(medium.recall, 1.0);
        assert_eq!(medium.f1_score, 0.667);
        assert_eq!(medium.support, 1);

        assert_eq!(report.per_class[&Low], ClassMetrics::default());
        assert_eq!(report.overall_accuracy, 0.6);

        // (0.5*2 + 1.0*2 + 0.5*1) / 5
        assert_eq!(report.weighted_avg.precision, 0.7);
        // (0.5*2 + 0.5*2 + 1.0*1) / 5
        assert_eq!(report.weighted_avg.recall, 0.6);
        // (0.5*2 + 0.667*2 + 0.667*1) / 5 = 0.6002
        assert_eq!(report.weighted_avg.f1_score, 0.6);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let report = accuracy_report(&[], &[]);
        assert_eq!(report.overall_accuracy, 0.0);
        assert_eq!(report.weighted_avg, WeightedAverages::default());
        assert_eq!(report.per_class.len(), 4);
    }

    fn labeled(id: u64, error: &str, ground_truth: Severity) -> LabeledBug {
        LabeledBug {
            id,
            report: BugReport::new(error, "ctx", "/api/orders"),
            ground_truth,
        }
    }

    #[tokio::test]
    async fn test_experiment_skips_failures() {
        let generator = Arc::new(ScriptedGenerator::new([
            r#"{"severity": "Critical", "impact_score": 10, "frequency_score": 8, "recovery_score": 9, "reasoning": "data loss"}"#,
        ]));
        generator.push_failure("model unavailable");
        generator.push_failure("model unavailable");
        let mut classifier = BugClassifier::new(generator.clone(), &GenerationParams::default());
        let bugs = vec![
            labeled(1, "Database connection timeout", Critical),
            labeled(2, "Pagination off by one", Medium),
            labeled(3, "Typo in message", Low),
        ];

        let mut metrics = MetricsCollector::new();
        let report = run_classification_experiment(&mut classifier, &bugs, &mut metrics).await;

        assert_eq!(report.total_bugs, 3);
        assert_eq!(report.detailed_results.len(), 1);
        assert_eq!(report.detailed_results[0].bug_id, 1);
        assert!(report.detailed_results[0].correct);
        assert!((report.detailed_results[0].weighted_score - 9.2).abs() < 1e-9);
        assert_eq!(report.overall_accuracy, 1.0);
        assert_eq!(report.severity_distribution[&Critical], 1);
        assert_eq!(report.severity_distribution[&Low], 0);
        assert_eq!(metrics.classification().accuracy, 100.0);
        assert_eq!(metrics.classification().total_classifications, 1);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("bugs.json");
        std::fs::write(
            &dataset,
            r#"[{"id": 7, "error_message": "500 on checkout", "test_context": "test_checkout", "endpoint": "/api/payments", "ground_truth": "High"}]"#,
        )
        .unwrap();

        let bugs = load_labeled_bugs(&dataset).await.unwrap();
        assert_eq!(bugs[0].id, 7);
        assert_eq!(bugs[0].ground_truth, High);
        assert_eq!(bugs[0].report.endpoint, "/api/payments");

        let generator = Arc::new(ScriptedGenerator::new(["This is a high impact failure"]));
        let mut classifier = BugClassifier::new(generator, &GenerationParams::default());
        let mut metrics = MetricsCollector::new();
        let report = run_classification_experiment(&mut classifier, &bugs, &mut metrics).await;

        let results_dir = dir.path().join("results");
        let (experiment, metrics_file) = save_experiment(&report, &metrics, &results_dir)
            .await
            .unwrap();

        assert_eq!(experiment, results_dir.join(EXPERIMENT_FILE));
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&experiment).unwrap()).unwrap();
        assert_eq!(saved["total_bugs"], 1);
        assert_eq!(saved["detailed_results"][0]["predicted"], "High");
        assert_eq!(saved["per_class_metrics"]["High"]["support"], 1);
        assert!(metrics_file.exists());
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_label() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("bugs.json");
        std::fs::write(
            &dataset,
            r#"[{"id": 1, "error_message": "e", "endpoint": "/x", "ground_truth": "Blocker"}]"#,
        )
        .unwrap();

        let result = load_labeled_bugs(&dataset).await;
        assert!(matches!(result, Err(EvaluationError::InvalidDataset(_))));
    }
}
