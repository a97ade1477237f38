//! Snippet extraction around the first keyword hit.
//!
//! Positions and lengths are counted in characters. Case folding is ASCII
//! only, so byte offsets in the lowercased text line up with the original.

/// Default snippet window in characters.
pub const DEFAULT_SNIPPET_LENGTH: usize = 200;

const ELLIPSIS: &str = "...";

/// Split a query into lowercase keywords on whitespace.
///
/// Repeated words are kept; an empty or blank query yields no keywords.
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_ascii_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Excerpt of `text` centred on the first query keyword found in it.
///
/// Keywords are tried in query order and the first one present wins, at its
/// leftmost occurrence. The window spans `snippet_length / 2` characters on
/// either side, with `...` marking a cut on each end. When no keyword occurs
/// the first `snippet_length` characters are returned instead.
pub fn extract_snippet(text: &str, query: &str, snippet_length: usize) -> String {
    let lowered = text.to_ascii_lowercase();
    let total = text.chars().count();
    let half = snippet_length / 2;

    for keyword in keywords(query) {
        let Some(byte_pos) = lowered.find(&keyword) else {
            continue;
        };

        let pos = text[..byte_pos].chars().count();
        let start = pos.saturating_sub(half);
        let end = (pos + half).min(total);

        let mut snippet = String::with_capacity(snippet_length + 2 * ELLIPSIS.len());
        if start > 0 {
            snippet.push_str(ELLIPSIS);
        }
        snippet.push_str(char_slice(text, start, end));
        if end < total {
            snippet.push_str(ELLIPSIS);
        }
        return snippet;
    }

    if total > snippet_length {
        format!("{}{ELLIPSIS}", char_slice(text, 0, snippet_length))
    } else {
        text.to_string()
    }
}

/// Slice `text` by character positions `[start, end)`.
fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let from = byte_at(start);
    let to = byte_at(end).max(from);
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_lowercase_and_keep_repeats() {
        assert_eq!(keywords("  Create a  DOC doc "), vec!["create", "a", "doc", "doc"]);
        assert!(keywords("").is_empty());
        assert!(keywords(" \t\n").is_empty());
    }

    #[test]
    fn window_centres_on_keyword() {
        let text = format!("{}needle{}", "a".repeat(300), "b".repeat(300));
        let snippet = extract_snippet(&text, "NEEDLE", 200);

        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), 206);
        // 100 chars before the hit, then the hit itself
        assert_eq!(&snippet[3..103], "a".repeat(100));
        assert!(snippet[103..].starts_with("needle"));
    }

    #[test]
    fn no_prefix_when_window_starts_at_zero() {
        let text = format!("needle {}", "x".repeat(500));
        let snippet = extract_snippet(&text, "needle", 200);
        assert!(snippet.starts_with("needle"));
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), 103);
    }

    #[test]
    fn no_suffix_when_window_reaches_end() {
        let text = format!("{}needle", "x".repeat(500));
        let snippet = extract_snippet(&text, "needle", 200);
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("needle"));
    }

    #[test]
    fn first_keyword_in_query_order_wins() {
        let text = "alpha comes first, then beta.";
        // "beta" is tried first and occurs, so the window centres on it
        let snippet = extract_snippet(text, "beta alpha", 10);
        assert_eq!(snippet, "...then beta.");
    }

    #[test]
    fn absent_keyword_is_skipped() {
        let text = "only gamma here";
        let snippet = extract_snippet(text, "delta gamma", 200);
        assert_eq!(snippet, "only gamma here");
    }

    #[test]
    fn substring_matches_inside_words() {
        let snippet = extract_snippet("Docusaurus rocks", "doc", 200);
        assert_eq!(snippet, "Docusaurus rocks");
    }

    #[test]
    fn fallback_returns_short_text_unchanged() {
        let text = "Short text without the word.";
        assert_eq!(extract_snippet(text, "missing", 200), text);
        assert_eq!(extract_snippet(text, "", 200), text);
    }

    #[test]
    fn fallback_truncates_long_text() {
        let text = "z".repeat(250);
        let snippet = extract_snippet(&text, "missing", 200);
        assert_eq!(snippet, format!("{}...", "z".repeat(200)));
    }

    #[test]
    fn fallback_exact_length_has_no_ellipsis() {
        let text = "y".repeat(200);
        assert_eq!(extract_snippet(&text, "missing", 200), text);
    }

    #[test]
    fn multibyte_text_slices_on_characters() {
        let text = format!("{}Docusaurus{}", "é".repeat(150), "ü".repeat(150));
        let snippet = extract_snippet(&text, "docusaurus", 20);
        assert_eq!(snippet, format!("...{}Docusaurus...", "é".repeat(10)));
    }

    #[test]
    fn snippet_never_exceeds_bound() {
        let text = "word ".repeat(400);
        for length in [0, 1, 7, 50, 200, 333] {
            let snippet = extract_snippet(&text, "word", length);
            assert!(snippet.chars().count() <= length + 6, "length {length}");
        }
    }
}
