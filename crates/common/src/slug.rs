//! URL slug derivation
//!
//! Lowercases, strips characters outside `[a-z0-9 \t\n-]`, collapses
//! whitespace runs to single hyphens, collapses hyphen runs, and trims
//! edge hyphens. Non-ASCII letters are stripped, not transliterated.

use regex_lite::Regex;
use std::sync::OnceLock;

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("valid strip pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn hyphen_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("valid hyphen pattern"))
}

/// Derive a URL slug from a human title.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = strip_re().replace_all(&lowered, "");
    let hyphenated = whitespace_re().replace_all(&stripped, "-");
    let collapsed = hyphen_re().replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("My First Post"), "my-first-post");
    }

    #[test]
    fn test_punctuation_and_non_ascii_stripped() {
        // Non-ASCII letters are stripped, not transliterated. A combining
        // mark is stripped on its own, leaving the ASCII base letter.
        let title = "Hello, World!  \u{00dc}ni\u{0308}code";
        assert_eq!(slugify(title), "hello-world-nicode");
    }

    #[test]
    fn test_precomposed_accented_letters_vanish() {
        // Precomposed forms carry no ASCII base to keep
        assert_eq!(slugify("\u{00dc}n\u{00ef}code"), "ncode");
    }

    #[test]
    fn test_only_slug_safe_characters() {
        let slug = slugify("  ~Weird -- Title!! with   spaces  ");
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.starts_with('-'));
        assert!(!slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn test_existing_hyphens_preserved() {
        assert_eq!(slugify("state-of-the-art"), "state-of-the-art");
    }

    #[test]
    fn test_all_stripped_yields_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("你好"), "");
    }

    #[test]
    fn test_numbers_kept() {
        assert_eq!(slugify("Top 10 Posts of 2025"), "top-10-posts-of-2025");
    }
}
