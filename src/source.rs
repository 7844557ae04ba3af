//! Core [`VideoSource`] implementation.
//!
//! `VideoSource` is the ingestion entry point for the pipeline. It opens a
//! video file (or URL), locates the best video stream, extracts and caches
//! [`SourceMetadata`], and hands out a [`FrameGrabber`] for decoding
//! individual frames.

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::{
    error::ShotscribeError,
    frames::FrameGrabber,
    metadata::{SourceMetadata, VideoStreamInfo},
};

/// An opened video ready for segmentation and annotation.
///
/// Created via [`VideoSource::open`], this struct holds the demuxer context
/// and cached metadata. Use [`frames()`](VideoSource::frames) to decode
/// individual frames and
/// [`detect_boundaries`](VideoSource::detect_boundaries) to segment the
/// video into shots.
///
/// # Example
///
/// ```no_run
/// use shotscribe::{SegmentationOptions, VideoSource};
///
/// let mut source = VideoSource::open("input.mp4").unwrap();
/// let boundaries = source
///     .detect_boundaries(&SegmentationOptions::default())
///     .unwrap();
/// println!("{} cuts detected", boundaries.len());
/// ```
pub struct VideoSource {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached metadata extracted at open time.
    pub(crate) metadata: SourceMetadata,
    /// Index of the best video stream, if one exists.
    pub(crate) video_stream_index: Option<usize>,
    /// Path to the opened video (kept for re-opening in parallel workers).
    pub(crate) file_path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for processing.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ShotscribeError::FileOpen`] if the file cannot be opened or
    /// has no recognisable media streams.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shotscribe::{ShotscribeError, VideoSource};
    ///
    /// let source = VideoSource::open("video.mp4")?;
    /// # Ok::<(), ShotscribeError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ShotscribeError> {
        let path = path.as_ref();
        Self::open_inner(path.to_path_buf(), identifier_for_path(path))
    }

    /// Open a video from a URL (any protocol FFmpeg supports).
    ///
    /// The identifier is derived from the last path segment of the URL.
    pub fn open_url(url: &str) -> Result<Self, ShotscribeError> {
        Self::open_inner(PathBuf::from(url), identifier_for_url(url))
    }

    fn open_inner(canonical_path: PathBuf, id: String) -> Result<Self, ShotscribeError> {
        log::debug!("Opening video: {}", canonical_path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| ShotscribeError::FileOpen {
            path: canonical_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context = ffmpeg_next::format::input(&canonical_path).map_err(|error| {
            ShotscribeError::FileOpen {
                path: canonical_path.clone(),
                reason: error.to_string(),
            }
        })?;

        // Locate the best video stream.
        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index());

        // Container-level duration.
        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let format = input_context.format().name().to_string();

        // Container-level metadata tags.
        let tags = {
            let mut map = HashMap::new();
            for (key, value) in input_context.metadata().iter() {
                map.insert(key.to_string(), value.to_string());
            }
            if map.is_empty() { None } else { Some(map) }
        };

        let video = if let Some(index) = video_stream_index {
            let stream = input_context
                .stream(index)
                .ok_or(ShotscribeError::NoVideoStream)?;
            let codec_parameters = stream.parameters();
            let decoder_context =
                CodecContext::from_parameters(codec_parameters).map_err(|error| {
                    ShotscribeError::FileOpen {
                        path: canonical_path.clone(),
                        reason: format!(
                            "Failed to read video codec parameters for stream {index}: {error}"
                        ),
                    }
                })?;
            let video_decoder =
                decoder_context
                    .decoder()
                    .video()
                    .map_err(|error| ShotscribeError::FileOpen {
                        path: canonical_path.clone(),
                        reason: format!(
                            "Failed to create video decoder for stream {index}: {error}"
                        ),
                    })?;

            // Compute frames per second from the stream's average frame rate.
            let frame_rate = stream.avg_frame_rate();
            let frames_per_second = if frame_rate.denominator() != 0 {
                frame_rate.numerator() as f64 / frame_rate.denominator() as f64
            } else {
                // Fallback: try the stream's rate field.
                let rate = stream.rate();
                if rate.denominator() != 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                }
            };

            let frame_count = if frames_per_second > 0.0 {
                (duration.as_secs_f64() * frames_per_second) as u64
            } else {
                0
            };

            let codec = video_decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            Some(VideoStreamInfo {
                width: video_decoder.width(),
                height: video_decoder.height(),
                frames_per_second,
                frame_count,
                codec,
                stream_index: index,
            })
        } else {
            None
        };

        let metadata = SourceMetadata {
            id,
            path: canonical_path.clone(),
            format,
            duration,
            video,
            tags,
        };

        log::info!(
            "Opened video: {} (format={}, duration={:.2}s)",
            canonical_path.display(),
            metadata.format,
            metadata.duration.as_secs_f64(),
        );

        if let Some(video) = &metadata.video {
            log::debug!(
                "Best video stream: index={}, {}x{}, {:.2} fps, codec={}, ~{} frames",
                video.stream_index,
                video.width,
                video.height,
                video.frames_per_second,
                video.codec,
                video.frame_count,
            );
        }

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            file_path: canonical_path,
        })
    }

    /// Get a reference to the cached source metadata.
    ///
    /// Metadata is extracted once during [`open`](VideoSource::open) and
    /// does not require additional decoding.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Obtain a [`FrameGrabber`] for decoding individual frames.
    ///
    /// The returned grabber borrows this source mutably; each decode seeks
    /// to the nearest keyframe and decodes forward.
    pub fn frames(&mut self) -> FrameGrabber<'_> {
        FrameGrabber { source: self }
    }

    /// Run pre-flight checks against the cached metadata and return a report.
    ///
    /// Inspects the metadata for conditions that would make segmentation or
    /// annotation unreliable (missing video stream, zero dimensions, unusual
    /// frame rates). Does not re-read the file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shotscribe::{ShotscribeError, VideoSource};
    ///
    /// let source = VideoSource::open("input.mp4")?;
    /// let report = source.inspect();
    /// println!("{report}");
    /// # Ok::<(), ShotscribeError>(())
    /// ```
    pub fn inspect(&self) -> crate::inspect::InspectionReport {
        crate::inspect::inspect_metadata(&self.metadata)
    }
}

/// Derive the pipeline identifier from a file path: the file stem, or the
/// whole file name when there is no stem.
pub(crate) fn identifier_for_path(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Derive the pipeline identifier from a URL: the last path segment without
/// its extension, falling back to the full URL.
pub(crate) fn identifier_for_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let without_query = segment.split(['?', '#']).next().unwrap_or(segment);
    let stem = without_query
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(without_query);
    if stem.is_empty() {
        url.to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_from_path_uses_stem() {
        assert_eq!(identifier_for_path(Path::new("/data/clip_01.mp4")), "clip_01");
        assert_eq!(identifier_for_path(Path::new("clip_01")), "clip_01");
    }

    #[test]
    fn identifier_from_url_strips_query_and_extension() {
        assert_eq!(
            identifier_for_url("https://example.org/videos/7295526580741229825.mp4?sig=abc"),
            "7295526580741229825"
        );
        assert_eq!(identifier_for_url("rtsp://cam.local/stream"), "stream");
    }
}
