//! Collaborator interfaces the engine orchestrates over.
//!
//! Concrete backends (Gemini, Firestore) implement these in their own
//! crates; tests substitute mocks. Orchestrators never see wire formats.

use std::path::Path;

use async_trait::async_trait;

use tcraft_media::MediaError;
use tcraft_models::{CreditTransaction, Frame, PastGeneration, TextContent, UserProfile};

/// Structured text generation (titles, description, hashtags, CTR).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text content for one prompt. The returned shape is a strict
    /// schema contract: a malformed upstream response is an error here, not
    /// a partial default.
    async fn generate_text(&self, prompt: &str) -> anyhow::Result<TextContent>;
}

/// Thumbnail image generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate `count` images at the given aspect ratio, returned as
    /// base64-encoded bytes.
    async fn generate_images(
        &self,
        prompt: &str,
        count: usize,
        aspect_ratio: &str,
    ) -> anyhow::Result<Vec<String>>;
}

/// Vision analysis of uploaded media.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Describe a single still image.
    async fn describe_image(&self, bytes: &[u8], mime_type: &str) -> anyhow::Result<String>;

    /// Describe a video from an ordered set of sampled frames.
    async fn describe_frames(&self, frames: &[Frame]) -> anyhow::Result<String>;

    /// Describe a video by uploading it whole (provider-side processing
    /// with an upload + poll lifecycle).
    async fn describe_video_file(&self, bytes: &[u8], mime_type: &str) -> anyhow::Result<String>;
}

/// Single-image editing from a free-text instruction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit_image(
        &self,
        image_base64: &str,
        mime_type: &str,
        instruction: &str,
    ) -> anyhow::Result<String>;
}

/// Persistent profile, credit, and history storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile, creating it with the starting credit grant when
    /// absent.
    async fn get_or_create_profile(
        &self,
        user_id: &str,
        email: Option<String>,
    ) -> anyhow::Result<UserProfile>;

    /// Atomically adjust the credit balance by `delta` and return the new
    /// balance. Debits floor at zero.
    async fn adjust_credits(&self, user_id: &str, delta: i64) -> anyhow::Result<u32>;

    /// Persist a completed generation.
    async fn save_generation(&self, generation: &PastGeneration) -> anyhow::Result<()>;

    /// Load a single generation owned by the user.
    async fn get_generation(
        &self,
        user_id: &str,
        generation_id: &str,
    ) -> anyhow::Result<Option<PastGeneration>>;

    /// List the user's generations, newest first.
    async fn list_generations(&self, user_id: &str) -> anyhow::Result<Vec<PastGeneration>>;

    /// Append a credit movement to the audit history. Best-effort from the
    /// orchestrator's point of view.
    async fn record_transaction(&self, tx: &CreditTransaction) -> anyhow::Result<()>;
}

/// Frame sampling seam, so orchestrator tests run without FFmpeg.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSampler: Send + Sync {
    async fn sample(&self, path: &Path, count: usize) -> Result<Vec<Frame>, MediaError>;
}

/// Production sampler backed by the FFmpeg extractor.
pub struct FfmpegSampler;

#[async_trait]
impl FrameSampler for FfmpegSampler {
    async fn sample(&self, path: &Path, count: usize) -> Result<Vec<Frame>, MediaError> {
        tcraft_media::extract_frames(path, count).await
    }
}
