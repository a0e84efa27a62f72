//! Still-frame extraction for AI analysis.
//!
//! Samples evenly spaced frames from a video. Seeks run strictly
//! sequentially: each capture is a separate FFmpeg invocation that must
//! finish before the next seek is issued. The extractor returns exactly the
//! requested number of frames in increasing timestamp order, or fails.

use std::path::Path;

use tracing::{debug, instrument};

use tcraft_models::Frame;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Default number of frames sampled per video.
pub const DEFAULT_FRAME_COUNT: usize = 5;

/// Per-capture bound. A single seek+capture stalling past this fails the
/// whole extraction rather than returning a partial sequence.
const CAPTURE_TIMEOUT_SECS: u64 = 30;

/// Compute evenly spaced sample timestamps: `i * duration / count`.
///
/// Pure; unit-testable without FFmpeg. Duration must be positive and
/// finite, count at least 1.
pub fn plan_timestamps(duration_secs: f64, count: usize) -> MediaResult<Vec<f64>> {
    if count == 0 {
        return Err(MediaError::InvalidFrameCount(count));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(MediaError::DurationUnavailable(format!(
            "cannot sample a video of duration {duration_secs}"
        )));
    }

    let interval = duration_secs / count as f64;
    Ok((0..count).map(|i| i as f64 * interval).collect())
}

/// Extract `count` evenly spaced frames from the video at `path`.
///
/// Frames are captured at the source's native resolution and encoded as
/// JPEG. Returns exactly `count` frames in increasing timestamp order, or
/// an error; never a partial sequence.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub async fn extract_frames(path: impl AsRef<Path>, count: usize) -> MediaResult<Vec<Frame>> {
    let path = path.as_ref();

    let info = probe_video(path).await?;
    let timestamps = plan_timestamps(info.duration, count)?;

    debug!(
        duration = info.duration,
        count, "Sampling frames at {:?}", timestamps
    );

    let workdir = tempfile::tempdir()?;
    let mut frames = Vec::with_capacity(count);

    // One capture at a time: the seek position is a single shared resource
    // on the source, so the loop awaits each FFmpeg run before the next.
    for (index, &timestamp_secs) in timestamps.iter().enumerate() {
        let frame_path = workdir.path().join(format!("frame_{index:02}.jpg"));

        let cmd = FfmpegCommand::new(path, &frame_path)
            .seek(timestamp_secs)
            .single_frame()
            .image_quality(2)
            .log_level("error");

        FfmpegRunner::new()
            .with_timeout(CAPTURE_TIMEOUT_SECS)
            .run(&cmd)
            .await?;

        let bytes = tokio::fs::read(&frame_path).await.map_err(|_| {
            MediaError::CaptureFailed {
                index,
                timestamp_secs,
            }
        })?;

        if bytes.is_empty() {
            return Err(MediaError::CaptureFailed {
                index,
                timestamp_secs,
            });
        }

        frames.push(Frame {
            bytes,
            mime_type: "image/jpeg".to_string(),
            timestamp_secs,
        });
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_timestamps_even_spacing() {
        let ts = plan_timestamps(10.0, 5).unwrap();
        assert_eq!(ts, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_plan_timestamps_strictly_increasing() {
        let ts = plan_timestamps(7.3, 4).unwrap();
        assert_eq!(ts.len(), 4);
        for pair in ts.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        // Last sample always lands before the end of the video.
        assert!(*ts.last().unwrap() < 7.3);
    }

    #[test]
    fn test_plan_timestamps_single_frame() {
        let ts = plan_timestamps(42.0, 1).unwrap();
        assert_eq!(ts, vec![0.0]);
    }

    #[test]
    fn test_plan_timestamps_rejects_zero_duration() {
        assert!(matches!(
            plan_timestamps(0.0, 5),
            Err(MediaError::DurationUnavailable(_))
        ));
        assert!(matches!(
            plan_timestamps(f64::NAN, 5),
            Err(MediaError::DurationUnavailable(_))
        ));
    }

    #[test]
    fn test_plan_timestamps_rejects_zero_count() {
        assert!(matches!(
            plan_timestamps(10.0, 0),
            Err(MediaError::InvalidFrameCount(0))
        ));
    }
}
