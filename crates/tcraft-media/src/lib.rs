//! FFmpeg CLI wrapper for the ThumbCrafter backend.
//!
//! This crate provides:
//! - FFprobe-based video metadata probing
//! - Sequential still-frame extraction for AI analysis
//! - A reusable FFmpeg command builder/runner

pub mod command;
pub mod error;
pub mod frames;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{extract_frames, plan_timestamps, DEFAULT_FRAME_COUNT};
pub use probe::{probe_video, VideoInfo};
