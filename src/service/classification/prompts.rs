//! Prompts for bug severity classification

/// Build the classification prompt for a failed test
pub fn build_classification_prompt(error_message: &str, test_context: &str, endpoint: &str) -> String {
    format!(
        r#"You are a senior QA engineer analyzing a software bug. Classify the severity of this bug based on business impact, frequency, and recovery difficulty.

**Failed Test Context:**
{test_context}

**Error Message:**
{error_message}

**Affected Endpoint:**
{endpoint}

**Classification Criteria:**
- **Critical**: Data loss, security vulnerabilities, system crashes, complete feature failure
- **High**: Major functionality broken, significant user impact, no workaround
- **Medium**: Partial functionality broken, moderate user impact, workaround available
- **Low**: Minor issues, cosmetic problems, negligible user impact

**Scoring Factors:**
1. **Impact** (0-10): Business criticality and data integrity
2. **Frequency** (0-10): How often users encounter this
3. **Recovery** (0-10): Difficulty of workaround or fix

**Output Format:**
Provide your analysis in EXACTLY this JSON format (no additional text):
{{
    "severity": "Critical|High|Medium|Low",
    "impact_score": <0-10>,
    "frequency_score": <0-10>,
    "recovery_score": <0-10>,
    "weighted_score": <calculated using weights 0.5, 0.3, 0.2>,
    "reasoning": "Brief explanation of classification"
}}

Analyze and classify now:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs_and_schema() {
        let prompt = build_classification_prompt(
            "AssertionError: assert 500 == 200",
            "Test user registration with invalid email format",
            "/api/users/register",
        );

        assert!(prompt.contains("AssertionError: assert 500 == 200"));
        assert!(prompt.contains("Test user registration with invalid email format"));
        assert!(prompt.contains("/api/users/register"));
        for key in [
            "\"severity\"",
            "\"impact_score\"",
            "\"frequency_score\"",
            "\"recovery_score\"",
            "\"weighted_score\"",
            "\"reasoning\"",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }
}
