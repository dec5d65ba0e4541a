//! String helpers for model output.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+\-]*[ \t]*\r?\n(.*?)```").unwrap());

/// Extract runnable source from model output.
///
/// Models usually wrap code in Markdown fences, sometimes splitting one
/// program across several blocks. The bodies of all fenced blocks are
/// joined in order; text without a fence is returned unchanged.
pub fn strip_code_fences(text: &str) -> String {
    let mut source = String::new();
    let mut fenced = false;
    for caps in FENCED_BLOCK.captures_iter(text) {
        fenced = true;
        if !source.is_empty() && !source.ends_with('\n') {
            source.push('\n');
        }
        source.push_str(&caps[1]);
    }
    if fenced {
        source
    } else {
        text.to_string()
    }
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_with_language() {
        let text = "Here you go:\n```python\nprint('hi')\n```\nEnjoy.";
        assert_eq!(strip_code_fences(text), "print('hi')\n");
    }

    #[test]
    fn test_strip_code_fences_plain_text_unchanged() {
        let text = "print('hi')";
        assert_eq!(strip_code_fences(text), text);
    }

    #[test]
    fn test_strip_code_fences_joins_every_block() {
        let text = "First the imports:\n```python\nimport os\n```\nThen the body:\n```python\nprint(os.getcwd())\n```";
        assert_eq!(strip_code_fences(text), "import os\nprint(os.getcwd())\n");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Build me a CREW", "crew"));
        assert!(!contains_ignore_case("Build me a team", "crew"));
    }
}
