//! Generation request and result data models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::media::MediaInput;
use crate::style::ThumbnailStyle;

/// Number of thumbnails produced per generation.
pub const THUMBNAIL_COUNT: usize = 4;

/// Structured text content returned by the text generator.
///
/// Every field is required: a response missing any of them is a protocol
/// violation and fails deserialization rather than defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextContent {
    /// Catchy, SEO-optimized video titles (expected: 5).
    pub titles: Vec<String>,
    /// Engaging video description with keywords and a call-to-action.
    pub description: String,
    /// Hashtags for discoverability (expected: 10-15).
    pub hashtags: Vec<String>,
    /// Predicted click-through rate as a percentage plus justification.
    #[serde(rename = "predictedCtr")]
    pub predicted_ctr: String,
}

/// A complete generation result: text content plus thumbnails.
///
/// `thumbnails.len()` is fixed for the lifetime of a generation; edits
/// replace elements in place, never resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedContent {
    pub titles: Vec<String>,
    pub description: String,
    pub hashtags: Vec<String>,
    #[serde(rename = "predictedCtr")]
    pub predicted_ctr: String,
    /// Base64-encoded PNG thumbnails.
    pub thumbnails: Vec<String>,
}

impl GeneratedContent {
    /// Merge text and image results into one content record.
    pub fn from_parts(text: TextContent, thumbnails: Vec<String>) -> Self {
        Self {
            titles: text.titles,
            description: text.description,
            hashtags: text.hashtags,
            predicted_ctr: text.predicted_ctr,
            thumbnails,
        }
    }

    /// Return a copy identical to `self` except `thumbnails[index]`.
    ///
    /// Callers bounds-check `index` first; out-of-range indices panic.
    pub fn with_thumbnail(&self, index: usize, image: String) -> Self {
        let mut next = self.clone();
        next.thumbnails[index] = image;
        next
    }
}

/// An immutable request to produce content for one media upload.
#[derive(Debug)]
pub struct GenerationRequest {
    pub user_prompt: String,
    pub style: ThumbnailStyle,
    pub media: MediaInput,
}

/// A persisted generation, listed newest-first in history.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PastGeneration {
    /// Opaque identifier assigned at persistence time.
    pub id: String,
    /// Owner of the generation.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// The user prompt that produced this generation.
    pub prompt: String,
    pub style: ThumbnailStyle,
    #[serde(flatten)]
    pub content: GeneratedContent,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
