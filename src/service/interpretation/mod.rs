//! Error log interpretation and root cause analysis using LLM

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::{
    GenerationParams, InterpretationRecord, InterpretationResult, InterpretationStatistics,
    InterpretedLog, LogEntry,
};
use crate::service::interpretation::parsing::parse_interpretation;
use crate::service::interpretation::prompts::build_interpretation_prompt;
use crate::service::llm::TextGenerator;

const INTERPRETATION_TEMPERATURE: f64 = 0.3;

/// Number of characters of the input log kept on the result
pub const STORED_LOG_CHARS: usize = 500;

pub mod error;
pub mod parsing;
pub mod prompts;
pub mod report;

pub use error::InterpretationError;
pub use report::generate_report;

/// Explains error logs and remembers every interpretation
pub struct LogInterpreter {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    history: Vec<InterpretationRecord>,
}

impl LogInterpreter {
    pub fn new(generator: Arc<dyn TextGenerator>, params: &GenerationParams) -> Self {
        Self {
            generator,
            params: params.with_temperature(INTERPRETATION_TEMPERATURE),
            history: Vec::new(),
        }
    }

    /// Interpret an error log from the named service
    pub async fn interpret(
        &mut self,
        error_log: &str,
        service_name: &str,
    ) -> Result<InterpretationResult, InterpretationError> {
        let start_time = std::time::Instant::now();
        tracing::info!(service = %service_name, log_length = error_log.len(), "Interpreting log");

        let prompt = build_interpretation_prompt(error_log, service_name);

        let response = self
            .generator
            .generate(&prompt, &self.params)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    service = %service_name,
                    model = %self.generator.model_name(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "LLM call for log interpretation failed"
                );
            })?;

        let (mut interpretation, outcome) = parse_interpretation(&response);
        interpretation.service_name = service_name.to_string();
        interpretation.original_log = truncate_chars(error_log, STORED_LOG_CHARS);

        self.history.push(InterpretationRecord {
            service: service_name.to_string(),
            interpretation: interpretation.clone(),
        });

        tracing::info!(
            service = %service_name,
            parse_outcome = ?outcome,
            elapsed_ms = start_time.elapsed().as_millis(),
            "Log interpretation completed"
        );

        Ok(interpretation)
    }

    /// Interpret logs one after another, in input order
    ///
    /// An input field named `interpretation` is replaced by the result.
    pub async fn interpret_batch(
        &mut self,
        logs: Vec<LogEntry>,
    ) -> Result<Vec<InterpretedLog>, InterpretationError> {
        let mut results = Vec::with_capacity(logs.len());

        for mut entry in logs {
            let interpretation = self.interpret(&entry.error_log, &entry.service_name).await?;
            entry.extra.remove(InterpretedLog::RESULT_KEY);
            results.push(InterpretedLog {
                entry,
                interpretation,
            });
        }

        Ok(results)
    }

    #[cfg(test)]
    pub fn history(&self) -> &[InterpretationRecord] {
        &self.history
    }

    pub fn statistics(&self) -> InterpretationStatistics {
        let services: BTreeSet<&str> = self
            .history
            .iter()
            .map(|record| record.service.as_str())
            .collect();

        InterpretationStatistics {
            total_interpretations: self.history.len(),
            unique_services: services.len(),
            services_analyzed: services.into_iter().map(str::to_string).collect(),
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
