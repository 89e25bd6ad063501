use crate::chunker::{chunk_text, Chunk};
use crate::error::RequestError;
use crate::models::ModelLimits;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of a split request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    pub text: Option<String>,
    pub model: Option<String>,
    /// Optional per-chunk budget; non-positive values mean "use the model limit"
    pub max_tokens: Option<i64>,
}

/// Body of a successful split response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResponse {
    pub chunks: Vec<Chunk>,
}

/// Body of a failed split response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Validate a split request and chunk its text
///
/// Blank text is rejected here rather than in the splitter, which would
/// simply return no chunks.
pub fn handle_split(
    limits: &ModelLimits,
    request: SplitRequest,
) -> Result<SplitResponse, RequestError> {
    let text = request.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(RequestError::MissingText);
    }

    let model = request.model.as_deref().unwrap_or_default();
    let budget = limits.resolve_budget(model, request.max_tokens);
    let chunks = chunk_text(text, budget);

    info!(
        model,
        budget,
        chunks = chunks.len(),
        "split request handled"
    );

    Ok(SplitResponse { chunks })
}
