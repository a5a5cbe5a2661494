use std::sync::LazyLock;

use regex::Regex;

static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\n|\r\n\r\n").unwrap());

/// Fragments shorter than this (trimmed, in characters) are not worth ranking.
pub const MIN_PASSAGE_CHARS: usize = 50;

/// Split a section body on blank lines, keeping fragments long enough to rank.
/// Fragments are returned untrimmed, in body order.
pub fn split_paragraphs(body: &str) -> Vec<&str> {
    BLANK_LINE_RE
        .split(body)
        .filter(|p| p.trim().chars().count() >= MIN_PASSAGE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_fragment_dropped() {
        let short = "x".repeat(30);
        let long = "y".repeat(80);
        let body = format!("{}\n\n{}", short, long);
        assert_eq!(split_paragraphs(&body), vec![long.as_str()]);
    }

    #[test]
    fn crlf_blank_lines_split() {
        let a = "a".repeat(60);
        let b = "b".repeat(60);
        let body = format!("{}\r\n\r\n{}", a, b);
        assert_eq!(split_paragraphs(&body), vec![a.as_str(), b.as_str()]);
    }

    #[test]
    fn threshold_counts_trimmed_chars() {
        let padded = format!("   {}   ", "z".repeat(49));
        assert!(split_paragraphs(&padded).is_empty());
        let exact = "é".repeat(50);
        assert_eq!(split_paragraphs(&exact).len(), 1);
    }

    #[test]
    fn single_newlines_do_not_split() {
        let body = format!("{}\n{}", "c".repeat(30), "d".repeat(30));
        assert_eq!(split_paragraphs(&body), vec![body.as_str()]);
    }
}
