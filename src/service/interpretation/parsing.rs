//! Section extraction from free-form interpretation responses
//!
//! Each section is looked up on its own, first as a bold `**Label:**` marker
//! and then as a plain `Label:` at the start of a line. When the root cause cannot be found either
//! way, the response is split into paragraphs and assigned by position.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::InterpretationResult;

pub const ROOT_CAUSE_PLACEHOLDER: &str = "Unable to determine root cause";
pub const COMPONENTS_PLACEHOLDER: &str = "Unknown";
pub const FIX_PLACEHOLDER: &str = "Manual investigation required";
pub const PREVENTION_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    RootCause,
    AffectedComponents,
    RecommendedFix,
    Prevention,
}

impl Section {
    const ALL: [Section; 4] = [
        Section::RootCause,
        Section::AffectedComponents,
        Section::RecommendedFix,
        Section::Prevention,
    ];

    fn label(&self) -> &'static str {
        match self {
            Section::RootCause => "Root Cause",
            Section::AffectedComponents => "Affected Components",
            Section::RecommendedFix => "Recommended Fix",
            Section::Prevention => "Prevention",
        }
    }
}

struct SectionPatterns {
    section: Section,
    marked: Regex,
    plain: Regex,
}

static PATTERNS: LazyLock<Vec<SectionPatterns>> = LazyLock::new(|| {
    Section::ALL
        .into_iter()
        .map(|section| {
            let label = regex::escape(section.label());
            SectionPatterns {
                section,
                marked: Regex::new(&format!(r"(?i)\*\*{label}:\*\*\s*"))
                    .expect("marked section pattern is valid"),
                plain: Regex::new(&format!(r"(?im)^[ \t]*(?:#+[ \t]*)?{label}:[ \t]*"))
                    .expect("plain section pattern is valid"),
            }
        })
        .collect()
});

/// Where a plain section ends: the next bold marker or the next line that
/// opens with a label
static PLAIN_SECTION_END: LazyLock<Regex> = LazyLock::new(|| {
    let labels = Section::ALL
        .iter()
        .map(|s| regex::escape(s.label()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?im)\*\*|^[ \t]*(?:#+[ \t]*)?(?:{labels}):"))
        .expect("section end pattern is valid")
});

/// Which strategy produced the interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    Sections,
    Paragraphs,
}

/// Split a response into the four interpretation fields
///
/// `service_name` and `original_log` are left empty for the caller.
pub fn parse_interpretation(response: &str) -> (InterpretationResult, ParseOutcome) {
    let mut result = InterpretationResult {
        raw_response: response.to_string(),
        ..Default::default()
    };

    for patterns in PATTERNS.iter() {
        let text = find_marked(response, &patterns.marked)
            .or_else(|| find_plain(response, &patterns.plain))
            .unwrap_or_default();

        match patterns.section {
            Section::RootCause => result.root_cause = text,
            Section::AffectedComponents => result.affected_components = text,
            Section::RecommendedFix => result.recommended_fix = text,
            Section::Prevention => result.prevention = text,
        }
    }

    if result.root_cause.is_empty() {
        tracing::debug!("Root cause section not found, falling back to paragraphs");
        return (paragraph_fallback(response), ParseOutcome::Paragraphs);
    }

    (result, ParseOutcome::Sections)
}

/// Text after `**Label:**` up to the next `**` or the end of the response
fn find_marked(response: &str, pattern: &Regex) -> Option<String> {
    let found = pattern.find(response)?;
    let rest = &response[found.end()..];
    let end = rest.find("**").unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

/// Text after a line-leading `Label:` (optionally a `#` heading) up to the
/// next section boundary
fn find_plain(response: &str, pattern: &Regex) -> Option<String> {
    let found = pattern.find(response)?;
    let end = PLAIN_SECTION_END
        .find_at(response, found.end())
        .map(|m| m.start())
        .unwrap_or(response.len());
    Some(response[found.end()..end].trim().to_string())
}

/// Assign the first four blank-line separated paragraphs by position
pub fn paragraph_fallback(response: &str) -> InterpretationResult {
    let normalized = response.replace("\r\n", "\n");
    let mut paragraphs = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let mut next_or = |placeholder: &str| {
        paragraphs
            .next()
            .unwrap_or_else(|| placeholder.to_string())
    };

    InterpretationResult {
        root_cause: next_or(ROOT_CAUSE_PLACEHOLDER),
        affected_components: next_or(COMPONENTS_PLACEHOLDER),
        recommended_fix: next_or(FIX_PLACEHOLDER),
        prevention: next_or(PREVENTION_PLACEHOLDER),
        raw_response: response.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "**Root Cause:**
The order service returned 500 because the database connection pool was exhausted.

**Affected Components:**
POST /api/orders, orders table

**Recommended Fix:**
1. Increase the pool size
2. Release connections in the error path

**Prevention:**
Add connection pool metrics and alerts.";

    #[test]
    fn test_all_marked_sections() {
        let (result, outcome) = parse_interpretation(FULL_RESPONSE);

        assert_eq!(outcome, ParseOutcome::Sections);
        assert_eq!(
            result.root_cause,
            "The order service returned 500 because the database connection pool was exhausted."
        );
        assert_eq!(result.affected_components, "POST /api/orders, orders table");
        assert_eq!(
            result.recommended_fix,
            "1. Increase the pool size\n2. Release connections in the error path"
        );
        assert_eq!(result.prevention, "Add connection pool metrics and alerts.");
        assert_eq!(result.raw_response, FULL_RESPONSE);
    }

    #[test]
    fn test_missing_prevention_is_empty_not_placeholder() {
        let response = "**Root Cause:** Null user id\n\n**Affected Components:** /api/users\n\n**Recommended Fix:** Validate input";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Sections);
        assert_eq!(result.root_cause, "Null user id");
        assert_eq!(result.affected_components, "/api/users");
        assert_eq!(result.recommended_fix, "Validate input");
        assert_eq!(result.prevention, "");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let response = "**ROOT CAUSE:** expired token\n**prevention:** rotate keys";
        let (result, _) = parse_interpretation(response);

        assert_eq!(result.root_cause, "expired token");
        assert_eq!(result.prevention, "rotate keys");
        assert_eq!(result.affected_components, "");
    }

    #[test]
    fn test_plain_labels_without_markup() {
        let response = "Root Cause: Payment gateway timeout\nAffected Components: /api/payments\nRecommended Fix: Retry with backoff\nPrevention: Circuit breaker";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Sections);
        assert_eq!(result.root_cause, "Payment gateway timeout");
        assert_eq!(result.affected_components, "/api/payments");
        assert_eq!(result.recommended_fix, "Retry with backoff");
        assert_eq!(result.prevention, "Circuit breaker");
    }

    #[test]
    fn test_label_inside_prose_is_not_a_section() {
        let response = "We believe the root cause: disk full on db host\n\nThe orders table.";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Paragraphs);
        assert_eq!(result.root_cause, "We believe the root cause: disk full on db host");
        assert_eq!(result.affected_components, "The orders table.");
    }

    #[test]
    fn test_label_word_inside_section_does_not_end_it() {
        let response = "Root Cause: the prevention: flag was disabled by a deploy\nAffected Components: orders";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Sections);
        assert_eq!(result.root_cause, "the prevention: flag was disabled by a deploy");
        assert_eq!(result.affected_components, "orders");
        assert_eq!(result.prevention, "");
    }

    #[test]
    fn test_heading_labels() {
        let response = "### Root Cause:\nStale cache entry\n\n### Recommended Fix:\nInvalidate on write\n  Prevention: TTL on keys";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Sections);
        assert_eq!(result.root_cause, "Stale cache entry");
        assert_eq!(result.recommended_fix, "Invalidate on write");
        assert_eq!(result.prevention, "TTL on keys");
    }

    #[test]
    fn test_mixed_markup_fields_parse_independently() {
        let response = "Prevention: run migrations in CI\n\n**Root Cause:** bad migration";
        let (result, _) = parse_interpretation(response);

        assert_eq!(result.root_cause, "bad migration");
        assert_eq!(result.prevention, "run migrations in CI");
    }

    #[test]
    fn test_paragraph_fallback_assigns_positionally() {
        let response = "The email validator rejects plus signs.\n\nUser registration.\n\n\n\nRelax the regex.";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Paragraphs);
        assert_eq!(result.root_cause, "The email validator rejects plus signs.");
        assert_eq!(result.affected_components, "User registration.");
        assert_eq!(result.recommended_fix, "Relax the regex.");
        assert_eq!(result.prevention, PREVENTION_PLACEHOLDER);
    }

    #[test]
    fn test_empty_response_gets_all_placeholders() {
        let (result, outcome) = parse_interpretation("   ");

        assert_eq!(outcome, ParseOutcome::Paragraphs);
        assert_eq!(result.root_cause, ROOT_CAUSE_PLACEHOLDER);
        assert_eq!(result.affected_components, COMPONENTS_PLACEHOLDER);
        assert_eq!(result.recommended_fix, FIX_PLACEHOLDER);
        assert_eq!(result.prevention, PREVENTION_PLACEHOLDER);
    }

    #[test]
    fn test_empty_root_cause_section_triggers_fallback() {
        let response = "**Root Cause:**\n**Affected Components:** orders\n\nsecond paragraph";
        let (result, outcome) = parse_interpretation(response);

        assert_eq!(outcome, ParseOutcome::Paragraphs);
        assert_eq!(
            result.root_cause,
            "**Root Cause:**\n**Affected Components:** orders"
        );
        assert_eq!(result.affected_components, "second paragraph");
    }
}
