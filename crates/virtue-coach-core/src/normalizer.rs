//! Output Normalizer: hard word-count ceiling on generated text.

/// Word ceiling for the single-recommendation endpoint.
pub const RECOMMENDATION_MAX_WORDS: usize = 150;

pub const ELLIPSIS: &str = "...";

/// Truncate to `max_words` whitespace-separated words and append `...` to the last one.
///
/// Text already within the ceiling is returned unchanged. A truncated result has exactly
/// `max_words` words, so normalizing it again is a no-op.
pub fn normalize(text: &str, max_words: usize) -> String {
    if text.split_whitespace().nth(max_words).is_none() {
        return text.to_string();
    }
    let mut out = text
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (1..=n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn truncates_to_exactly_the_ceiling() {
        let out = normalize(&words(200), 150);
        assert_eq!(out.split_whitespace().count(), 150);
        assert!(out.ends_with("w150..."));
        assert!(!out.contains("w151"));
    }

    #[test]
    fn short_text_is_untouched() {
        let input = words(100);
        assert_eq!(normalize(&input, 150), input);
    }

    #[test]
    fn untouched_text_keeps_its_original_whitespace() {
        let input = "  Breathe.\n\nThen   write one honest sentence.  ";
        assert_eq!(normalize(input, 150), input);
    }

    #[test]
    fn exactly_at_ceiling_is_untouched() {
        let input = words(150);
        assert_eq!(normalize(&input, 150), input);
    }

    #[test]
    fn normalizing_twice_does_not_double_the_marker() {
        let once = normalize(&words(151), 150);
        let twice = normalize(&once, 150);
        assert_eq!(once, twice);
        assert_eq!(twice.matches(ELLIPSIS).count(), 1);
    }

    #[test]
    fn whitespace_runs_collapse_when_truncating() {
        let out = normalize("one \n\t two   three four", 2);
        assert_eq!(out, "one two...");
    }

    #[test]
    fn zero_ceiling() {
        assert_eq!(normalize("", 0), "");
        assert_eq!(normalize("word", 0), "...");
    }
}
