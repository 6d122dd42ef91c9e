//! Recovery of a classification from free-form model output
//!
//! Parsing never fails. A JSON object embedded in the response is preferred;
//! without one the response is searched for severity keywords; a JSON object
//! that does not decode yields the default classification. Whatever path is
//! taken, the result then goes through [`validate_classification`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::scoring::{DEFAULT_SCORE, clamp_score, weighted_score};
use crate::model::{ClassificationResult, Severity};

pub const KEYWORD_REASONING: &str = "Parsed from unstructured response";
pub const DEFAULT_REASONING: &str = "Default classification due to parsing error";

/// First brace-delimited object without nested braces
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{[^{}]*\}").expect("JSON object pattern is valid"));

/// Which recovery path produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Decoded from an embedded JSON object
    Structured,
    /// Inferred from severity keywords in unstructured text
    Keyword,
    /// Embedded JSON object was malformed
    Default,
}

/// Classification fields as reported by the model, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateClassification {
    pub severity: Option<String>,
    pub impact_score: Option<f64>,
    pub frequency_score: Option<f64>,
    pub recovery_score: Option<f64>,
    pub reasoning: Option<String>,
}

impl CandidateClassification {
    /// Read the known keys out of a decoded JSON object
    ///
    /// Non-numeric scores and non-string labels are treated as absent.
    fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        let number = |key: &str| object.get(key).and_then(Value::as_f64);

        Self {
            severity: text("severity"),
            impact_score: number("impact_score"),
            frequency_score: number("frequency_score"),
            recovery_score: number("recovery_score"),
            reasoning: text("reasoning"),
        }
    }

    fn with_default_scores(severity: Severity, reasoning: &str) -> Self {
        Self {
            severity: Some(severity.to_string()),
            impact_score: Some(DEFAULT_SCORE),
            frequency_score: Some(DEFAULT_SCORE),
            recovery_score: Some(DEFAULT_SCORE),
            reasoning: Some(reasoning.to_string()),
        }
    }
}

/// Parse and validate a model response into a classification
pub fn parse_classification(response: &str) -> (ClassificationResult, ParseOutcome) {
    let (candidate, outcome) = extract_candidate(response);
    (validate_classification(candidate), outcome)
}

fn extract_candidate(response: &str) -> (CandidateClassification, ParseOutcome) {
    let Some(found) = JSON_OBJECT.find(response) else {
        return (keyword_fallback(response), ParseOutcome::Keyword);
    };

    match serde_json::from_str::<Map<String, Value>>(found.as_str()) {
        Ok(object) => (
            CandidateClassification::from_object(&object),
            ParseOutcome::Structured,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode classification JSON, using default");
            (default_classification(), ParseOutcome::Default)
        }
    }
}

/// Infer severity from keywords when no JSON object is present
///
/// Checked in order: "critical", "high", "low"; otherwise Medium.
pub fn keyword_fallback(response: &str) -> CandidateClassification {
    let lower = response.to_lowercase();

    let severity = if lower.contains("critical") {
        Severity::Critical
    } else if lower.contains("high") {
        Severity::High
    } else if lower.contains("low") {
        Severity::Low
    } else {
        Severity::Medium
    };

    CandidateClassification::with_default_scores(severity, KEYWORD_REASONING)
}

pub fn default_classification() -> CandidateClassification {
    CandidateClassification::with_default_scores(Severity::Medium, DEFAULT_REASONING)
}

/// Coerce a candidate into a well-formed classification
///
/// Unknown labels become Medium, missing scores become 5, every score is
/// clamped to `[0, 10]` and the weighted score is recomputed from the
/// clamped values.
pub fn validate_classification(candidate: CandidateClassification) -> ClassificationResult {
    let severity = match candidate.severity.as_deref().map(str::parse::<Severity>) {
        Some(Ok(severity)) => severity,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Coercing severity to Medium");
            Severity::Medium
        }
        None => Severity::Medium,
    };

    let impact_score = clamp_score(candidate.impact_score.unwrap_or(DEFAULT_SCORE));
    let frequency_score = clamp_score(candidate.frequency_score.unwrap_or(DEFAULT_SCORE));
    let recovery_score = clamp_score(candidate.recovery_score.unwrap_or(DEFAULT_SCORE));

    ClassificationResult {
        severity,
        impact_score,
        frequency_score,
        recovery_score,
        weighted_score: weighted_score(impact_score, frequency_score, recovery_score),
        reasoning: candidate.reasoning.unwrap_or_default(),
    }
}
