//! Error types for the `shotscribe` crate.
//!
//! This module defines [`ShotscribeError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry rich context to aid
//! debugging, including file paths, frame numbers, and upstream error messages.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `shotscribe` operations.
///
/// Every public method that can fail returns `Result<T, ShotscribeError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShotscribeError {
    /// The video file could not be opened.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// The requested frame number exceeds the total frame count.
    #[error("Frame {frame_number} is out of range (video has {total_frames} frames)")]
    FrameOutOfRange {
        /// The frame number that was requested.
        frame_number: u64,
        /// The total number of frames in the video.
        total_frames: u64,
    },

    /// The requested timestamp exceeds the video duration.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(Duration),

    /// A boundary-detection threshold outside the accepted 0–100 range.
    #[error("Invalid boundary threshold {0} (expected 0.0-100.0)")]
    InvalidThreshold(f64),

    /// An annotation referenced a shot that does not exist.
    #[error("Shot {shot_index} does not exist in video '{video_id}' ({shot_count} shots)")]
    UnknownShot {
        /// Identifier of the video whose shot list was addressed.
        video_id: String,
        /// The shot index that was requested.
        shot_index: usize,
        /// Number of shots actually present.
        shot_count: usize,
    },

    /// FFmpeg filter graph setup or processing failed.
    #[error("Filter graph error: {0}")]
    FilterGraphError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// Interchange serialization failed.
    #[error("Export serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// A remote annotation request failed (connection, HTTP status, timeout).
    #[error("Annotator '{detector}' request failed: {reason}")]
    AnnotatorRequest {
        /// Identifier of the detector that issued the request.
        detector: String,
        /// Underlying transport or server failure.
        reason: String,
    },

    /// A remote annotation reply could not be interpreted.
    #[error("Annotator '{detector}' returned an unusable reply: {reason}")]
    AnnotatorReply {
        /// Identifier of the detector that received the reply.
        detector: String,
        /// What was wrong with the reply.
        reason: String,
    },

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for ShotscribeError {
    fn from(error: FfmpegError) -> Self {
        ShotscribeError::FfmpegError(error.to_string())
    }
}
