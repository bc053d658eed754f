//! Lenient normalization of near-valid JSON.
//!
//! Exactly one repair: trailing commas immediately preceding `}` or `]`
//! (whitespace allowed between) are dropped. Commas inside quoted strings are
//! untouched. Unbalanced brackets and unquoted keys are NOT repaired here;
//! those defects fall through to the parse stage and escalate from there.

/// Remove trailing commas before a closing `}` or `]`. Idempotent.
pub fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
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
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                // Keep the comma unless the scope closes after it. The scan
                // skips whole comma runs so a second pass finds nothing new.
                let mut j = i + 1;
                while j < chars.len() && (chars[j].is_whitespace() || chars[j] == ',') {
                    j += 1;
                }
                if !(j < chars.len() && (chars[j] == '}' || chars[j] == ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trailing_comma_before_brace() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1,}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_trailing_comma_before_bracket() {
        assert_eq!(strip_trailing_commas(r#"[1, 2, 3,]"#), r#"[1, 2, 3]"#);
    }

    #[test]
    fn test_trailing_comma_with_whitespace() {
        assert_eq!(
            strip_trailing_commas("{\"a\": 1,\n  \t}"),
            "{\"a\": 1\n  \t}"
        );
    }

    #[test]
    fn test_separating_commas_kept() {
        let s = r#"{"a": 1, "b": [1, 2]}"#;
        assert_eq!(strip_trailing_commas(s), s);
    }

    #[test]
    fn test_commas_inside_strings_untouched() {
        let s = r#"{"note": "a, b, c,}", "x": 1}"#;
        assert_eq!(strip_trailing_commas(s), s);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let s = r#"{"note": "say \",\" now,}"}"#;
        assert_eq!(strip_trailing_commas(s), s);
    }

    #[test]
    fn test_nested_trailing_commas() {
        assert_eq!(
            strip_trailing_commas(r#"{"a": [1, 2,], "b": {"c": 3,},}"#),
            r#"{"a": [1, 2], "b": {"c": 3}}"#
        );
    }

    #[test]
    fn test_comma_run_before_closer_fully_dropped() {
        assert_eq!(strip_trailing_commas("[1,,]"), "[1]");
        assert_eq!(strip_trailing_commas("[1, , ]"), "[1  ]");
    }

    #[test]
    fn test_does_not_balance_brackets() {
        // Out of scope for this stage: left untouched.
        assert_eq!(strip_trailing_commas(r#"{"a": 1"#), r#"{"a": 1"#);
    }

    proptest! {
        /// Running the normalizer on its own output changes nothing.
        #[test]
        fn prop_idempotent(input in "[a-z0-9\",:\\[\\]{} \\\\]{0,80}") {
            let once = strip_trailing_commas(&input);
            let twice = strip_trailing_commas(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
