//! Requirements file parsing
//!
//! Expected format, one block per requirement, blocks separated by `---`:
//!
//! ```text
//! [Requirement Name]
//! Endpoint: /api/endpoint
//! Method: POST
//! Description: Requirement description here
//! that may continue on following lines
//! ---
//! ```

use crate::model::Requirement;

const SECTION_SEPARATOR: &str = "---";

/// Parse every complete requirement block; blocks without an endpoint or a
/// description are skipped
pub fn parse_requirements(content: &str) -> Vec<Requirement> {
    content
        .split(SECTION_SEPARATOR)
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .filter_map(parse_section)
        .collect()
}

fn parse_section(section: &str) -> Option<Requirement> {
    let mut requirement = Requirement::default();

    for (i, line) in section.split('\n').enumerate() {
        let line = line.trim();

        if i == 0 && line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            requirement.name = line[1..line.len() - 1].to_lowercase().replace(' ', "_");
        } else if let Some(value) = line.strip_prefix("Endpoint:") {
            requirement.endpoint = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Method:") {
            requirement.method = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Description:") {
            requirement.description = value.trim().to_string();
        } else if !requirement.description.is_empty() && !line.is_empty() {
            requirement.description.push(' ');
            requirement.description.push_str(line);
        }
    }

    if requirement.endpoint.is_empty() || requirement.description.is_empty() {
        tracing::debug!(name = %requirement.name, "Skipping incomplete requirement block");
        return None;
    }

    Some(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIREMENTS: &str = "[User Registration]
Endpoint: http://localhost:8000/api/users/register
Method: POST
Description: Users must be able to register with email and password.
Email must be unique.
---
[List Orders]
Endpoint: http://localhost:8001/api/orders
Method: GET
Description: Users can list their orders with pagination.
---
[Missing Endpoint]
Description: This block is incomplete.
---
";

    #[test]
    fn test_parse_blocks() {
        let requirements = parse_requirements(REQUIREMENTS);

        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[0].name, "user_registration");
        assert_eq!(
            requirements[0].endpoint,
            "http://localhost:8000/api/users/register"
        );
        assert_eq!(requirements[0].method, "POST");
        assert_eq!(
            requirements[0].description,
            "Users must be able to register with email and password. Email must be unique."
        );
        assert_eq!(requirements[1].name, "list_orders");
        assert_eq!(requirements[1].method, "GET");
    }

    #[test]
    fn test_method_defaults_to_post() {
        let requirements =
            parse_requirements("[Pay]\nEndpoint: /api/payments\nDescription: Process payments");
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].method, "POST");
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_requirements("").is_empty());
        assert!(parse_requirements("---\n---\n").is_empty());
    }
}
