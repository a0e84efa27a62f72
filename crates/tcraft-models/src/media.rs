//! Media input types.
//!
//! An upload is exactly one of image or video. Images keep their full byte
//! content in memory; videos are spooled to a scoped temp file so FFmpeg can
//! seek them later without the whole file being decoded up front.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// A scoped handle to a video spooled to disk for frame sampling.
///
/// The backing file is removed when the handle is dropped.
#[derive(Debug)]
pub struct VideoHandle {
    file: NamedTempFile,
}

impl VideoHandle {
    /// Spool raw video bytes to a temp file and return the handle.
    pub fn from_bytes(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    /// Path to the spooled video, valid for the lifetime of the handle.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the full video content back (used by the direct-upload
    /// analysis path).
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.file.path())
    }
}

/// A validated media upload: exactly one variant per upload.
#[derive(Debug)]
pub enum MediaInput {
    Image { bytes: Vec<u8>, mime_type: String },
    Video { handle: VideoHandle, mime_type: String },
}

impl MediaInput {
    /// The MIME type of the upload.
    pub fn mime_type(&self) -> &str {
        match self {
            MediaInput::Image { mime_type, .. } => mime_type,
            MediaInput::Video { mime_type, .. } => mime_type,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaInput::Video { .. })
    }
}

/// A single still image sampled from a video.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Encoded image bytes (JPEG).
    pub bytes: Vec<u8>,
    /// Image MIME type, e.g. "image/jpeg".
    pub mime_type: String,
    /// Position of this frame in the source video, in seconds.
    pub timestamp_secs: f64,
}
