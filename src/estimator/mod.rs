
use serde::{Deserialize, Serialize};

/// Approximate number of characters per token for English-like text
pub const CHARS_PER_TOKEN: usize = 4;

/// Word and token counts for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStats {
    /// Whitespace-separated word count
    pub words: usize,
    /// Estimated token count
    pub tokens: usize,
}

/// Estimate token count for a piece of text
///
/// Heuristic: one token per 4 characters, rounded up, never below 1.
/// Characters are Unicode scalar values so multi-byte text is not
/// overcounted. Every caller in the crate goes through this function.
pub fn estimate_tokens(text: &str) -> usize {
    tokens_for_chars(text.chars().count())
}

/// Token estimate for a text of `chars` characters
///
/// Lets callers that already track a character count (the chunk buffer)
/// estimate without rescanning the text.
pub fn tokens_for_chars(chars: usize) -> usize {
    chars.div_ceil(CHARS_PER_TOKEN).max(1)
}

/// Word and token statistics for user-supplied text
///
/// Whitespace-only input yields zero for both counts.
pub fn text_stats(text: &str) -> TextStats {
    let clean = text.trim();
    if clean.is_empty() {
        return TextStats::default();
    }

    TextStats {
        words: clean.split_whitespace().count(),
        tokens: estimate_tokens(clean),
    }
}
