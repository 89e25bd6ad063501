mod splitter;


pub use splitter::{split_paragraphs, split_sentences, split_text, UNIT_SEPARATOR};

use crate::estimator::estimate_tokens;
use crate::models::ModelLimits;
use serde::{Deserialize, Serialize};

/// 1-based position of a chunk within a split
pub type ChunkId = usize;

/// A budget-bounded slice of a transcript, ready to paste into a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Sequence index, starting at 1
    pub id: ChunkId,
    /// Suggested file name, e.g. `chat-part-01.txt`
    pub filename: String,
    /// Trimmed, non-empty chunk text
    pub text: String,
    /// Estimated token count of `text`
    pub approx_tokens: usize,
}

/// File name for the chunk at a 1-based index
pub fn chunk_filename(id: ChunkId) -> String {
    format!("chat-part-{:02}.txt", id)
}

/// Split text under an explicit budget and annotate each chunk
pub fn chunk_text(text: &str, token_budget: usize) -> Vec<Chunk> {
    split_text(text, token_budget)
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let id = i + 1;
            Chunk {
                id,
                filename: chunk_filename(id),
                approx_tokens: estimate_tokens(&text),
                text,
            }
        })
        .collect()
}

/// Split text for a named model, optionally narrowing the budget
///
/// See [`ModelLimits::resolve_budget`] for how `requested` is applied.
pub fn chunk_for_model(
    limits: &ModelLimits,
    text: &str,
    model: &str,
    requested: Option<i64>,
) -> Vec<Chunk> {
    chunk_text(text, limits.resolve_budget(model, requested))
}
