//! Text helpers shared by the classification and translation layers.

/// Fixed input budget for the hosted classification and translation models.
///
/// Inputs longer than this are cut before the request is sent. The cut is
/// silent, so an indicator appearing late in a long message can be dropped.
pub const MAX_INPUT_TOKENS: usize = 512;

/// Truncate `text` to at most `max_tokens` whitespace-separated tokens.
///
/// Returns a borrowed prefix of the input; the full text is returned
/// unchanged when it fits the budget.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> &str {
    let mut count = 0;
    let mut in_token = false;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_token = false;
        } else if !in_token {
            in_token = true;
            count += 1;
            if count > max_tokens {
                return text[..i].trim_end();
            }
        }
    }

    text
}

/// Short preview of analyzed text for report blocks (first `max_chars` chars).
pub fn preview(text: &str, max_chars: usize) -> String {
    let truncated: String = text.chars().take(max_chars).collect();
    if truncated.len() < text.len() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_within_budget() {
        assert_eq!(truncate_tokens("one two three", 5), "one two three");
        assert_eq!(truncate_tokens("", 5), "");
    }

    #[test]
    fn test_truncate_over_budget() {
        assert_eq!(truncate_tokens("one two three four", 2), "one two");
        assert_eq!(truncate_tokens("a  b\n c", 2), "a  b");
    }

    #[test]
    fn test_truncate_at_fixed_budget() {
        let words: Vec<String> = (0..600).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        let cut = truncate_tokens(&text, MAX_INPUT_TOKENS);
        assert_eq!(cut.split_whitespace().count(), MAX_INPUT_TOKENS);
        assert!(cut.ends_with("w511"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
