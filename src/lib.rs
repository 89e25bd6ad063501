// Public API exports
pub mod chunker;
pub mod config;
pub mod error;
pub mod estimator;
pub mod input;
pub mod models;
pub mod request;
pub mod summary;

// Re-export main types for convenience
pub use chunker::{chunk_filename, chunk_for_model, chunk_text, split_text, Chunk, ChunkId};
pub use config::ChunkerConfig;
pub use error::{InputError, RequestError};
pub use estimator::{estimate_tokens, text_stats, TextStats};
pub use input::{human_file_size, load_text_file, write_chunks, LoadedText};
pub use models::{ModelLimits, DEFAULT_LIMIT, DEFAULT_MODEL};
pub use request::{handle_split, ErrorResponse, SplitRequest, SplitResponse};

pub use summary::{
    create_summary, MemorySummaryStore, SqliteSummaryStore, Summary, SummaryDraft, SummaryLog,
    SummaryStore,
};
