//! Post-processing: clean the model's answer before JSON parsing.
//!
//! With `responseMimeType: application/json` the answer is normally bare
//! JSON, but models still occasionally wrap it in a ```json fence or prefix
//! it with a BOM. These rules strip that without touching the JSON itself.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model text.
///
/// 1. Strip invisible Unicode (BOM, zero-width spaces)
/// 2. Strip an outer ```json / ``` fence
/// 3. Trim surrounding whitespace
pub fn clean_model_text(input: &str) -> String {
    let s = remove_invisible_chars(input);
    let s = strip_code_fences(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip invisible Unicode ──────────────────────────────────────────

static RE_INVISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}]").unwrap());

fn remove_invisible_chars(input: &str) -> String {
    RE_INVISIBLE.replace_all(input, "").to_string()
}

// ── Rule 2: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_untouched() {
        assert_eq!(clean_model_text(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn strips_json_fence() {
        let input = "```json\n{\"title\": \"A\"}\n```";
        assert_eq!(clean_model_text(input), "{\"title\": \"A\"}");
    }

    #[test]
    fn strips_plain_fence_with_crlf() {
        let input = "```\r\n{\"title\": \"A\"}\r\n```\r\n";
        assert_eq!(clean_model_text(input), "{\"title\": \"A\"}");
    }

    #[test]
    fn strips_bom_and_zero_width() {
        let input = "\u{FEFF}{\"a\":\u{200B}1}";
        assert_eq!(clean_model_text(input), "{\"a\":1}");
    }

    #[test]
    fn inner_backticks_survive() {
        let input = r#"{"title": "Use ```code```"}"#;
        assert_eq!(clean_model_text(input), input);
    }
}
