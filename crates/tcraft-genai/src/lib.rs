//! Gemini/Imagen REST client for the ThumbCrafter backend.
//!
//! This crate provides:
//! - Structured text content generation (titles, description, hashtags, CTR)
//! - Thumbnail image generation via Imagen
//! - Vision analysis of images, frame sets, and uploaded videos
//! - Single-image editing
//!
//! It also implements the engine's collaborator traits so the orchestrators
//! can be wired to it without knowing about wire formats.

pub mod client;
pub mod error;
pub mod files;
mod providers;

pub use client::{GeminiClient, PollConfig};
pub use error::{GenAiError, GenAiResult};
pub use files::FileState;
