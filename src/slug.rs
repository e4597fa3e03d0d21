//! Title → slug derivation.
//!
//! The transform is pure and total: any input maps to a lowercase,
//! hyphen-delimited, URL-safe string, and re-deriving a derived slug is a
//! no-op. Absent input is represented by the empty string.

use once_cell::sync::Lazy;
use regex::Regex;

// Punctuation first, whitespace second. Runs of letters/digits pass through
// untouched; a run of anything else collapses to a single hyphen. The second
// pass absorbs hyphens the first pass left next to whitespace, so derived
// slugs never contain `--` and the transform is idempotent.
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]+").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]*\s[-\s]*").expect("valid regex"));

/// Derive a URL slug from a post title.
pub fn slugify_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let dashed = NON_ALNUM.replace_all(&lowered, "-");
    WHITESPACE.replace_all(&dashed, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(slugify_title(""), "");
        assert_eq!(slugify_title("   "), "");
    }

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify_title("Hello World"), "hello-world");
        assert_eq!(slugify_title("Rust 2024 Roadmap"), "rust-2024-roadmap");
    }

    #[test]
    fn trailing_punctuation_collapses_before_whitespace_pass() {
        assert_eq!(slugify_title("  My Title!! "), "my-title-");
    }

    #[test]
    fn whitespace_runs_collapse_to_one_hyphen() {
        assert_eq!(slugify_title("A  B"), "a-b");
        assert_eq!(slugify_title("a \t\n b"), "a-b");
    }

    #[test]
    fn punctuation_adjacent_to_whitespace() {
        assert_eq!(slugify_title("Hello, World!"), "hello-world-");
        assert_eq!(slugify_title("one -- two"), "one-two");
    }

    #[test]
    fn non_ascii_collapses_to_hyphen() {
        assert_eq!(slugify_title("café au lait"), "caf-au-lait");
    }

    #[test]
    fn idempotent_over_sample_corpus() {
        let samples = [
            "",
            "   ",
            "Hello, World!",
            "  My Title!! ",
            "A  B",
            "a--b",
            "...",
            "Ünicode — and dashes",
            "multi\nline\ttitle",
            "already-a-slug",
            "trailing space ",
            "!leading",
            "a ! b",
            "42 is the answer?",
        ];
        for s in samples {
            let once = slugify_title(s);
            assert_eq!(slugify_title(&once), once, "not a fixed point for {s:?}");
        }
    }
}
