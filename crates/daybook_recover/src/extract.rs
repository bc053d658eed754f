//! Balanced-object extraction from arbitrary text.
//!
//! Locates the first top-level balanced `{...}` span, tolerant of surrounding
//! prose and markdown code fences. Braces inside quoted string content never
//! affect the nesting depth; a `\"` inside a string does not close it.

use crate::error::RecoverError;

/// Drop fence-marker lines: a line whose content is ``` optionally followed
/// by a language tag (only `json` is expected, matched case-insensitively).
fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("```") {
                let tag = rest.trim();
                !(tag.is_empty() || tag.eq_ignore_ascii_case("json"))
            } else {
                true
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Return the substring spanning the first top-level balanced object literal.
pub fn extract_object(text: &str) -> Result<String, RecoverError> {
    let cleaned = strip_code_fences(text);
    let start = cleaned.find('{').ok_or(RecoverError::Extraction)?;

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in cleaned[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Ok(cleaned[start..end].to_string());
                }
            }
            _ => {}
        }
    }

    // Depth never returned to zero before input ended.
    Err(RecoverError::Extraction)
}
