use crate::estimator::tokens_for_chars;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Separator placed between units merged into the same chunk
pub const UNIT_SEPARATOR: &str = "\n\n";

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("paragraph pattern is valid"));

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

/// Level of the text hierarchy a unit was cut at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Paragraph,
    Sentence,
}

/// Split text into chunks whose estimated token count fits `token_budget`
///
/// Rules:
/// - Paragraphs (separated by blank lines) are packed greedily, joined by a
///   blank line
/// - A paragraph over budget is re-split into sentences, which are packed
///   the same way
/// - A single sentence over budget is emitted alone, never cut further
/// - Empty or whitespace-only input yields no chunks
pub fn split_text(text: &str, token_budget: usize) -> Vec<String> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        return vec![];
    }

    let mut packer = ChunkPacker::new(token_budget.max(1));
    for paragraph in &paragraphs {
        packer.append(paragraph, Granularity::Paragraph);
    }
    let chunks = packer.finish();

    debug!(
        paragraphs = paragraphs.len(),
        chunks = chunks.len(),
        token_budget,
        "split text into chunks"
    );

    chunks
}

/// Split on runs of two or more newlines, trimming and dropping empty parts
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split after `.`, `!` or `?` when followed by whitespace
///
/// The terminating punctuation stays with its sentence; the whitespace run
/// is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        // Punctuation is ASCII, so the boundary is one byte past the match start
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Greedy accumulator that turns units into budget-bounded chunks
struct ChunkPacker {
    token_budget: usize,
    chunks: Vec<String>,
    buffer: String,
    /// Character count of `buffer`
    buffer_chars: usize,
}

impl ChunkPacker {
    fn new(token_budget: usize) -> Self {
        Self {
            token_budget,
            chunks: Vec::new(),
            buffer: String::new(),
            buffer_chars: 0,
        }
    }

    fn append(&mut self, part: &str, level: Granularity) {
        let part_chars = part.chars().count();
        let part_tokens = tokens_for_chars(part_chars);

        if part_tokens > self.token_budget {
            match level {
                Granularity::Paragraph => {
                    for sentence in split_sentences(part) {
                        self.append(sentence, Granularity::Sentence);
                    }
                }
                Granularity::Sentence => {
                    // Indivisible: keep it whole in a chunk of its own
                    self.flush();
                    debug!(
                        tokens = part_tokens,
                        token_budget = self.token_budget,
                        "emitting oversized sentence as its own chunk"
                    );
                    self.chunks.push(part.to_string());
                }
            }
            return;
        }

        // Measure the buffer as it would read after the append, separator included
        if !self.buffer.is_empty() {
            let merged_chars = self.buffer_chars + UNIT_SEPARATOR.len() + part_chars;
            if tokens_for_chars(merged_chars) > self.token_budget {
                self.flush();
            }
        }

        if !self.buffer.is_empty() {
            self.buffer.push_str(UNIT_SEPARATOR);
            self.buffer_chars += UNIT_SEPARATOR.len();
        }
        self.buffer.push_str(part);
        self.buffer_chars += part_chars;
    }

    fn flush(&mut self) {
        let text = self.buffer.trim();
        if !text.is_empty() {
            self.chunks.push(text.to_string());
        }
        self.buffer.clear();
        self.buffer_chars = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}
