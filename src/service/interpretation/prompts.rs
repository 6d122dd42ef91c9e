//! Prompts for log interpretation

/// Build the root-cause analysis prompt for an error log
///
/// The full log is embedded; truncation only applies to what is stored.
pub fn build_interpretation_prompt(error_log: &str, service_name: &str) -> String {
    format!(
        r#"You are a debugging expert analyzing a system failure. Provide a clear, human-readable explanation of what went wrong and how to fix it.

**Service:** {service_name}

**Error Log:**
{error_log}

**Your Task:**
1. Identify the root cause of the failure
2. Explain what components are affected
3. Provide actionable remediation steps
4. Suggest preventive measures

**Output Format:**
Provide your analysis in this structure:

**Root Cause:**
<One clear sentence explaining what caused the failure>

**Affected Components:**
<List the impacted services, endpoints, or data>

**Recommended Fix:**
<Step-by-step remediation instructions>

**Prevention:**
<Suggestions to prevent similar issues>

Analyze this error now:"#
    )
}
