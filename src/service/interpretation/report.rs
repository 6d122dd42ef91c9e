//! Plain-text rendering of an interpretation

use crate::model::InterpretationResult;

const HEAVY_RULE: &str = "═════════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str = "─────────────────────────────────────────────────────────────────";

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

/// Render a boxed, human-readable report
pub fn generate_report(interpretation: &InterpretationResult) -> String {
    let service = if interpretation.service_name.is_empty() {
        "Unknown"
    } else {
        &interpretation.service_name
    };

    let mut report = String::new();
    report.push_str("╔══════════════════════════════════════════════════════════════╗\n");
    report.push_str("║                    LOG INTERPRETATION REPORT                  ║\n");
    report.push_str("╚══════════════════════════════════════════════════════════════╝\n\n");
    report.push_str(&format!("Service: {}\n", service));

    let sections = [
        ("ROOT CAUSE", &interpretation.root_cause),
        ("AFFECTED COMPONENTS", &interpretation.affected_components),
        ("RECOMMENDED FIX", &interpretation.recommended_fix),
        ("PREVENTION", &interpretation.prevention),
    ];

    for (title, body) in sections {
        report.push_str(&format!(
            "\n{LIGHT_RULE}\n{title}\n{LIGHT_RULE}\n{}\n",
            or_na(body)
        ));
    }

    report.push('\n');
    report.push_str(HEAVY_RULE);
    report.push('\n');
    report
}
