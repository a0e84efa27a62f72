//! Core orchestration for the ThumbCrafter backend.
//!
//! This crate owns the media-to-prompt pipeline: ingesting an upload,
//! analyzing it (directly or via sampled frames), composing the text and
//! thumbnail prompts, fanning out the two generation calls concurrently,
//! and the stateful single-thumbnail edit loop. It talks to AI backends and
//! the profile store exclusively through the traits in [`traits`], so the
//! whole pipeline is testable without live services.

pub mod analyzer;
pub mod credits;
pub mod edit;
pub mod error;
pub mod generate;
pub mod ingest;
pub mod prompt;
pub mod traits;

pub use credits::{CreditLedger, CreditLedgers};
pub use edit::{EditOrchestrator, EditSession, EditSessions, EditState};
pub use error::{EngineError, EngineResult};
pub use generate::{AnalysisMode, GenerationConfig, GenerationOrchestrator};
pub use ingest::ingest;
pub use traits::{
    FfmpegSampler, FrameSampler, ImageEditor, ImageGenerator, ProfileStore, TextGenerator,
    VisionAnalyzer,
};
