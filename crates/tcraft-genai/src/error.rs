//! Error types for AI backend calls.

use thiserror::Error;

/// Result type for AI backend operations.
pub type GenAiResult<T> = Result<T, GenAiError>;

/// Errors that can occur when talking to the generation backend.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("GEMINI_API_KEY not set")]
    MissingApiKey,

    #[error("Gemini API request failed: {0}")]
    RequestFailed(String),

    #[error("Gemini API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("No content in Gemini response")]
    NoContent,

    /// The response parsed as JSON but did not match the contracted shape.
    /// Missing fields are a protocol violation, not a recoverable default.
    #[error("Response did not match the expected schema: {0}")]
    SchemaViolation(String),

    #[error("No image data found in edit response")]
    NoImagePayload,

    #[error("Expected {expected} images, got {actual}")]
    ImageCountMismatch { expected: usize, actual: usize },

    /// The provider reported the uploaded video as failed.
    #[error("Video processing failed: {0}")]
    ProcessingFailed(String),

    /// The provider never reached a terminal state within the cap.
    /// Distinct from `ProcessingFailed` so callers can tell a stuck upload
    /// from a rejected one.
    #[error("Video processing did not finish within {0} seconds")]
    ProcessingTimeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenAiError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }
}
