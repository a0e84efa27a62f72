//! Media ingestion: validate an upload into a `MediaInput`.

use tcraft_models::{MediaInput, VideoHandle};

use crate::error::{EngineError, EngineResult};

/// Validate an uploaded file as image or video.
///
/// Images keep their full byte content in memory. Videos are spooled to a
/// scoped temp file whose handle lives as long as the returned `MediaInput`;
/// dropping the input releases the file. Anything that is not `image/*` or
/// `video/*` is rejected before any further work.
pub fn ingest(bytes: Vec<u8>, mime_type: &str) -> EngineResult<MediaInput> {
    if mime_type.starts_with("image/") {
        Ok(MediaInput::Image {
            bytes,
            mime_type: mime_type.to_string(),
        })
    } else if mime_type.starts_with("video/") {
        let handle = VideoHandle::from_bytes(&bytes)
            .map_err(|e| EngineError::Ingest(e.to_string()))?;
        Ok(MediaInput::Video {
            handle,
            mime_type: mime_type.to_string(),
        })
    } else {
        Err(EngineError::UnsupportedMediaType(mime_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_image() {
        let media = ingest(vec![0xFF, 0xD8], "image/jpeg").unwrap();
        assert!(matches!(media, MediaInput::Image { .. }));
        assert_eq!(media.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_ingest_video_spools_to_disk() {
        let media = ingest(b"mp4 bytes".to_vec(), "video/mp4").unwrap();
        match &media {
            MediaInput::Video { handle, .. } => {
                assert!(handle.path().exists());
                assert_eq!(handle.read_bytes().unwrap(), b"mp4 bytes");
            }
            _ => panic!("expected video variant"),
        }
    }

    #[test]
    fn test_ingest_rejects_other_types() {
        let err = ingest(vec![], "application/pdf").unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedMediaType(_)));
    }
}
