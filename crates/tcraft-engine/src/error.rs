//! Engine error taxonomy.
//!
//! Every failure an orchestrator can produce maps to exactly one variant;
//! the API layer converts these into a single user-facing error string.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced by the generation and edit orchestrators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Upload was neither image/* nor video/*. User input rejected, no retry.
    #[error("Unsupported media type: {0}. Please upload an image or a video.")]
    UnsupportedMediaType(String),

    /// Spooling the upload to disk failed.
    #[error("Failed to read uploaded media: {0}")]
    Ingest(String),

    /// Video unreadable or seeking stalled. Surfaced, no auto-retry.
    #[error("Frame extraction failed: {0}")]
    FrameExtraction(#[from] tcraft_media::MediaError),

    /// Vision/analysis backend failure, propagated verbatim.
    #[error("Failed to analyze media: {0}")]
    Analysis(String),

    /// The thumbnail half of a generation failed.
    #[error("Failed to generate thumbnails: {0}")]
    ThumbnailGeneration(String),

    /// The text half of a generation failed.
    #[error("Failed to generate text content: {0}")]
    TextGeneration(String),

    /// Image-editing backend failure; the caller keeps the prior content.
    #[error("Failed to edit thumbnail: {0}")]
    Edit(String),

    /// At most one edit may be in flight per thumbnail set.
    #[error("An edit is already in progress for this generation")]
    EditInProgress,

    #[error("Thumbnail index {index} is out of range (generation has {len} thumbnails)")]
    InvalidThumbnailIndex { index: usize, len: usize },

    /// Pre-flight rejection; never reaches the network.
    #[error("You are out of credits. Please purchase more to continue generating content.")]
    InsufficientCredits,

    /// Persistence collaborator failure.
    #[error("Failed to save generation: {0}")]
    Store(String),

    #[error("Generation not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// The single human-readable message surfaced to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// True for failures caused by the user's input rather than a backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EngineError::UnsupportedMediaType(_)
                | EngineError::InvalidThumbnailIndex { .. }
                | EngineError::InsufficientCredits
                | EngineError::EditInProgress
        )
    }
}
