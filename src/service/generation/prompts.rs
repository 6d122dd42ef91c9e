//! Prompts for test and edge case generation

/// Build the pytest generation prompt for a requirement
pub fn build_test_generation_prompt(requirement: &str, api_endpoint: &str, http_method: &str) -> String {
    let method = http_method.to_lowercase();
    format!(
        r#"You are an expert Software Development Engineer in Test (SDET). Generate comprehensive pytest test cases based on the following requirement.

**Requirement:**
{requirement}

**API Endpoint:** {api_endpoint}
**HTTP Method:** {http_method}

**Instructions:**
1. Generate pytest test functions with proper fixtures
2. Include parametrize decorators for multiple test scenarios
3. Test both success cases and error cases
4. Include edge cases and boundary conditions
5. Use descriptive test function names
6. Add assertions for status codes and response data
7. Use the 'requests' library for HTTP calls

**Output Format:**
Provide ONLY valid Python code with pytest test functions. Do not include any markdown formatting or explanations outside the code. Start directly with imports.

**Example Structure:**
```python
import pytest
import requests

@pytest.mark.parametrize("input,expected", [...])
def test_scenario_name(input, expected):
    response = requests.{method}("{api_endpoint}", json=input)
    assert response.status_code == expected
```

Generate the complete test code now:"#
    )
}

/// Build the edge case discovery prompt for a function specification
pub fn build_edge_case_prompt(function_spec: &str) -> String {
    format!(
        r#"You are a security-focused SDET specializing in edge case discovery. Identify all possible edge cases for the following function specification.

**Function Specification:**
{function_spec}

**Edge Case Categories to Consider:**
1. **Boundary Values**: Min/max limits, empty inputs, very large inputs
2. **Invalid Input**: Wrong types, malformed data, SQL injection attempts
3. **Concurrency**: Race conditions, simultaneous requests
4. **State Issues**: Duplicate operations, out-of-order operations
5. **Security**: Authentication bypass, privilege escalation
6. **Performance**: Timeout scenarios, resource exhaustion

**Output Format:**
List each edge case with:
- Description of the scenario
- Expected system behavior
- Test data example

Provide at least 8-10 edge cases. Be creative and thorough.

Generate edge cases now:"#
    )
}
