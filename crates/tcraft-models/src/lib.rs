//! Shared data models for the ThumbCrafter backend.
//!
//! This crate provides Serde-serializable types for:
//! - Media inputs (image/video) and sampled frames
//! - Thumbnail styles
//! - Generation requests and results
//! - User profiles and credit transactions

pub mod credits;
pub mod generation;
pub mod media;
pub mod style;

// Re-export common types
pub use credits::{CreditKind, CreditTransaction, UserProfile, STARTING_CREDITS};
pub use generation::{GeneratedContent, GenerationRequest, PastGeneration, TextContent};
pub use media::{Frame, MediaInput, VideoHandle};
pub use style::{StyleParseError, ThumbnailStyle};
