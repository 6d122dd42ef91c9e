//! Post-processing of generated pytest code

use std::sync::LazyLock;

use regex::Regex;

static PYTHON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```python\n?").expect("python fence pattern is valid"));
static PLAIN_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\n?").expect("fence pattern is valid"));

/// Strip markdown fences and make sure the required imports are present
pub fn clean_generated_code(code: &str) -> String {
    let code = PYTHON_FENCE.replace_all(code, "");
    let code = PLAIN_FENCE.replace_all(&code, "");
    let mut code = code.trim().to_string();

    if !code.contains("import pytest") {
        code = format!("import pytest\n{}", code);
    }
    if !code.contains("import requests") && code.contains("requests.") {
        code = code.replacen("import pytest\n", "import pytest\nimport requests\n", 1);
    }

    code
}

/// Cheap structural check of Python source
///
/// Brackets must balance outside string literals and comments, string
/// literals must be closed, and no markdown fence may remain.
pub fn is_structurally_valid(code: &str) -> bool {
    if code.contains("```") {
        return false;
    }

    let chars: Vec<char> = code.chars().collect();
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            quote @ ('\'' | '"') => match skip_string(&chars, i, quote) {
                Some(end) => i = end,
                None => return false,
            },
            open @ ('(' | '[' | '{') => stack.push(open),
            close @ (')' | ']' | '}') => {
                let expected = match close {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
        i += 1;
    }

    stack.is_empty()
}

/// Index of the closing quote of the literal opening at `start`
fn skip_string(chars: &[char], start: usize, quote: char) -> Option<usize> {
    let is_quote = |at: usize| chars.get(at) == Some(&quote);
    let triple = is_quote(start + 1) && is_quote(start + 2);

    let mut i = if triple { start + 3 } else { start + 1 };
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '\n' if !triple => return None,
            c if c == quote => {
                if !triple {
                    return Some(i);
                }
                if is_quote(i + 1) && is_quote(i + 2) {
                    return Some(i + 2);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Dedent function definitions that were indented by mistake
pub fn attempt_fix(code: &str) -> String {
    code.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("def ") && !line.starts_with("def ") {
                trimmed
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
