//! Source metadata types.
//!
//! This module defines the metadata structures returned by
//! [`VideoSource::metadata`](crate::VideoSource::metadata). Metadata is
//! extracted once when the file is opened and cached for the lifetime of the
//! source.

use std::{collections::HashMap, path::PathBuf, time::Duration};

/// Complete metadata for an ingested video.
///
/// Contains the stable identifier used throughout the pipeline (shot ids,
/// thumbnail file names, export rows all derive from it), the container
/// format and duration, and the video stream description.
///
/// # Example
///
/// ```no_run
/// use shotscribe::VideoSource;
///
/// let source = VideoSource::open("input.mp4").unwrap();
/// let metadata = source.metadata();
/// println!("{}: {:?} ({})", metadata.id, metadata.duration, metadata.format);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct SourceMetadata {
    /// Stable identifier for this video (file stem, or last URL segment).
    pub id: String,
    /// Path or URL the video was opened from.
    pub path: PathBuf,
    /// Container format name (e.g. `"mp4"`, `"matroska"`, `"avi"`).
    pub format: String,
    /// Total duration of the container.
    pub duration: Duration,
    /// Video stream metadata, if a video stream is present.
    pub video: Option<VideoStreamInfo>,
    /// Container-level metadata tags, if any were present.
    pub tags: Option<HashMap<String, String>>,
}

/// Metadata for a video stream.
///
/// Includes dimensions, frame rate, estimated frame count, and codec name.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoStreamInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Raw FFmpeg stream index of this video stream.
    pub stream_index: usize,
}
