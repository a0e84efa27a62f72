//! Media analysis passthrough.
//!
//! Thin wrappers over the vision collaborator: construct the request,
//! unwrap the response, and convert upstream failures into
//! `EngineError::Analysis` with the backend's message intact.

use tcraft_models::Frame;

use crate::error::{EngineError, EngineResult};
use crate::traits::VisionAnalyzer;

/// Describe a single uploaded image.
pub async fn analyze_image(
    vision: &dyn VisionAnalyzer,
    bytes: &[u8],
    mime_type: &str,
) -> EngineResult<String> {
    vision
        .describe_image(bytes, mime_type)
        .await
        .map_err(|e| EngineError::Analysis(e.to_string()))
}

/// Describe a video from its sampled frames.
pub async fn analyze_frames(
    vision: &dyn VisionAnalyzer,
    frames: &[Frame],
) -> EngineResult<String> {
    vision
        .describe_frames(frames)
        .await
        .map_err(|e| EngineError::Analysis(e.to_string()))
}

/// Describe a video by shipping the whole file to the provider.
pub async fn analyze_video_file(
    vision: &dyn VisionAnalyzer,
    bytes: &[u8],
    mime_type: &str,
) -> EngineResult<String> {
    vision
        .describe_video_file(bytes, mime_type)
        .await
        .map_err(|e| EngineError::Analysis(e.to_string()))
}
