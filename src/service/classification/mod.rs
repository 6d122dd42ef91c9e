//! Bug severity classification using LLM
//!
//! Asks the model for a JSON verdict, recovers what it can from the answer
//! and keeps an in-memory history of every classification made.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{
    BugReport, ClassificationRecord, ClassificationResult, ClassificationStatistics,
    ClassifiedBug, GenerationParams,
};
use crate::service::classification::parsing::parse_classification;
use crate::service::classification::prompts::build_classification_prompt;
use crate::service::llm::TextGenerator;

/// Near-deterministic sampling for classification
const CLASSIFICATION_TEMPERATURE: f64 = 0.2;

pub mod error;
pub mod parsing;
pub mod prompts;
pub mod scoring;

pub use error::ClassificationError;

/// Classifies bug severity and remembers every result
pub struct BugClassifier {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    history: Vec<ClassificationRecord>,
}

impl BugClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>, params: &GenerationParams) -> Self {
        Self {
            generator,
            params: params.with_temperature(CLASSIFICATION_TEMPERATURE),
            history: Vec::new(),
        }
    }

    /// Classify the severity of a single failed test
    pub async fn classify(
        &mut self,
        error_message: &str,
        test_context: &str,
        endpoint: &str,
    ) -> Result<ClassificationResult, ClassificationError> {
        let start_time = std::time::Instant::now();
        tracing::info!(endpoint = %endpoint, "Classifying bug");

        let prompt = build_classification_prompt(error_message, test_context, endpoint);
        let prompt_length = prompt.len();

        let response = match self.generator.generate(&prompt, &self.params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    endpoint = %endpoint,
                    model = %self.generator.model_name(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    error = %e,
                    "LLM call for bug classification failed"
                );
                return Err(e.into());
            }
        };

        let (classification, outcome) = parse_classification(&response);

        tracing::info!(
            endpoint = %endpoint,
            severity = %classification.severity,
            weighted_score = classification.weighted_score,
            parse_outcome = ?outcome,
            elapsed_ms = start_time.elapsed().as_millis(),
            "Bug classified"
        );

        self.history.push(ClassificationRecord {
            endpoint: endpoint.to_string(),
            classification: classification.clone(),
        });

        Ok(classification)
    }

    /// Classify bugs one after another, in input order
    ///
    /// Each output carries the input record next to its classification; an
    /// input field named `classification` is replaced by the result. The
    /// first generation failure aborts the batch.
    pub async fn classify_batch(
        &mut self,
        bugs: Vec<BugReport>,
    ) -> Result<Vec<ClassifiedBug>, ClassificationError> {
        let mut results = Vec::with_capacity(bugs.len());

        for mut bug in bugs {
            let classification = self
                .classify(&bug.error_message, &bug.test_context, &bug.endpoint)
                .await?;
            bug.extra.remove(ClassifiedBug::RESULT_KEY);
            results.push(ClassifiedBug {
                bug,
                classification,
            });
        }

        Ok(results)
    }

    #[cfg(test)]
    pub fn history(&self) -> &[ClassificationRecord] {
        &self.history
    }

    /// Count, severity distribution and mean weighted score over the history
    pub fn statistics(&self) -> ClassificationStatistics {
        if self.history.is_empty() {
            return ClassificationStatistics::default();
        }

        let mut severity_distribution = BTreeMap::new();
        let mut total_score = 0.0;

        for record in &self.history {
            *severity_distribution
                .entry(record.classification.severity)
                .or_insert(0) += 1;
            total_score += record.classification.weighted_score;
        }

        ClassificationStatistics {
            total_classifications: self.history.len(),
            severity_distribution,
            average_weighted_score: total_score / self.history.len() as f64,
        }
    }
}
