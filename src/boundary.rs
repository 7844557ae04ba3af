//! Shot boundary detection.
//!
//! Uses FFmpeg's `scdet` filter to locate visual discontinuities (cuts)
//! in a video stream. Results are returned as timestamps, frame numbers,
//! and confidence scores, ready to be assembled into a
//! [`ShotList`](crate::ShotList).
//!
//! # Example
//!
//! ```no_run
//! use shotscribe::{SegmentationOptions, ShotscribeError, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! let boundaries = source.detect_boundaries(&SegmentationOptions::default())?;
//! for boundary in &boundaries {
//!     println!("Cut at {:?} (frame {}), score {:.2}",
//!         boundary.timestamp, boundary.frame_number, boundary.score);
//! }
//! # Ok::<(), ShotscribeError>(())
//! ```

use std::ffi::CStr;
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext,
    filter::Graph as FilterGraph, frame::Video as VideoFrame,
};
use ffmpeg_sys_next::AVPixelFormat;

use crate::{
    configuration::PipelineOptions, conversion, error::ShotscribeError,
    metadata::VideoStreamInfo, source::VideoSource,
};

/// A detected shot boundary.
///
/// Each instance marks the first frame of a new shot.
#[derive(Debug, Clone)]
pub struct ShotBoundary {
    /// Timestamp of the cut.
    pub timestamp: Duration,
    /// Frame number at which the cut was detected.
    pub frame_number: u64,
    /// Boundary confidence score (typically 0.0–100.0).
    ///
    /// Higher values indicate a more obvious cut. The threshold used during
    /// detection determines the minimum score reported.
    pub score: f64,
}

/// Strategy used for boundary detection.
///
/// `Full` uses FFmpeg's `scdet` filter and decodes frames.
/// `Keyframes` uses packet-level keyframes as shot boundaries (very fast).
/// `Auto` chooses a strategy based on stream size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryDetectionMode {
    /// Choose automatically: prefer keyframe-based detection on long videos,
    /// otherwise run full `scdet` analysis.
    #[default]
    Auto,
    /// Full decode + `scdet` filter.
    Full,
    /// Fast packet-level keyframe boundary detection.
    Keyframes,
}

/// Segmentation settings.
///
/// Controls the sensitivity of the boundary detector. The default
/// threshold of 10.0 works well for most content.
#[derive(Debug, Clone)]
pub struct SegmentationOptions {
    /// Minimum score for a frame to be considered a shot boundary.
    ///
    /// Range 0.0–100.0. Lower values detect more (weaker) cuts; higher
    /// values only detect obvious hard cuts. Default: 10.0.
    pub threshold: f64,
    /// Boundary detection strategy.
    pub mode: BoundaryDetectionMode,
    /// Optional maximum analysis duration from the start of the stream.
    ///
    /// When set, detection stops once decoded frame timestamps exceed this
    /// duration. This is useful to keep latency predictable on long videos.
    pub max_duration: Option<Duration>,
    /// Optional maximum number of detected boundaries.
    ///
    /// When set, detection returns as soon as this many cuts are found.
    pub max_boundaries: Option<usize>,
    /// Optional minimum shot duration.
    ///
    /// Cuts arriving sooner than this after the previous accepted cut are
    /// merged into the running shot, so rapid flicker does not produce
    /// two-frame shots in the exported dataset. Default: off.
    pub min_shot_duration: Option<Duration>,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            threshold: 10.0,
            mode: BoundaryDetectionMode::Auto,
            max_duration: None,
            max_boundaries: None,
            min_shot_duration: None,
        }
    }
}

impl SegmentationOptions {
    /// Create a new segmentation configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum score required for shot boundaries.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the boundary detection strategy.
    pub fn mode(mut self, mode: BoundaryDetectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Limit analysis to the first `duration` of the video.
    pub fn max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    /// Stop after detecting at most `max_boundaries` cuts.
    pub fn max_boundaries(mut self, max_boundaries: usize) -> Self {
        self.max_boundaries = Some(max_boundaries);
        self
    }

    /// Merge cuts that would produce shots shorter than `duration`.
    pub fn min_shot_duration(mut self, duration: Duration) -> Self {
        self.min_shot_duration = Some(duration);
        self
    }

    fn validate(&self) -> Result<(), ShotscribeError> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(ShotscribeError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

impl VideoSource {
    /// Detect shot boundaries in the video stream.
    ///
    /// Runs the strategy selected in `options` and applies the minimum
    /// shot duration merge before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ShotscribeError::NoVideoStream`] if the file has no video,
    /// [`ShotscribeError::InvalidThreshold`] for thresholds outside
    /// 0.0–100.0, or decode/filter errors.
    pub fn detect_boundaries(
        &mut self,
        options: &SegmentationOptions,
    ) -> Result<Vec<ShotBoundary>, ShotscribeError> {
        self.detect_boundaries_with(options, &PipelineOptions::default())
    }

    /// Detect shot boundaries with progress and cancellation support.
    ///
    /// Like [`detect_boundaries`](VideoSource::detect_boundaries) but
    /// accepts [`PipelineOptions`] carrying a progress callback and a
    /// cancellation token.
    pub fn detect_boundaries_with(
        &mut self,
        options: &SegmentationOptions,
        pipeline: &PipelineOptions,
    ) -> Result<Vec<ShotBoundary>, ShotscribeError> {
        options.validate()?;

        let video = self
            .metadata
            .video
            .as_ref()
            .ok_or(ShotscribeError::NoVideoStream)?
            .clone();

        let boundaries = detect_boundaries_impl(self, &video, options, pipeline)?;

        let merged = match options.min_shot_duration {
            Some(min) if video.frames_per_second > 0.0 => {
                let min_frames =
                    conversion::timestamp_to_frame_number(min, video.frames_per_second);
                enforce_min_gap(boundaries, min_frames)
            }
            _ => boundaries,
        };

        Ok(merged)
    }
}

/// Drop cuts that arrive within `min_frames` of the previously accepted cut.
///
/// The first cut is measured against frame 0 (start of the opening shot).
/// Input order is preserved; the input must already be sorted by frame.
pub(crate) fn enforce_min_gap(
    boundaries: Vec<ShotBoundary>,
    min_frames: u64,
) -> Vec<ShotBoundary> {
    if min_frames == 0 {
        return boundaries;
    }

    let mut kept: Vec<ShotBoundary> = Vec::with_capacity(boundaries.len());
    let mut last_cut_frame: u64 = 0;

    for boundary in boundaries {
        if boundary.frame_number.saturating_sub(last_cut_frame) >= min_frames {
            last_cut_frame = boundary.frame_number;
            kept.push(boundary);
        } else {
            log::debug!(
                "Merging cut at frame {} (closer than {} frames to previous cut)",
                boundary.frame_number,
                min_frames,
            );
        }
    }

    kept
}

fn detect_boundaries_impl(
    source: &mut VideoSource,
    video: &VideoStreamInfo,
    options: &SegmentationOptions,
    pipeline: &PipelineOptions,
) -> Result<Vec<ShotBoundary>, ShotscribeError> {
    let selected_mode = match options.mode {
        BoundaryDetectionMode::Auto => {
            // On long videos, packet-level keyframe analysis is dramatically
            // faster and usually sufficient for dataset-level pace statistics.
            if video.frame_count > 6_000 && options.max_duration.is_none() {
                BoundaryDetectionMode::Keyframes
            } else {
                BoundaryDetectionMode::Full
            }
        }
        mode => mode,
    };

    if selected_mode == BoundaryDetectionMode::Keyframes {
        return detect_boundaries_from_keyframes(source, video, options, pipeline);
    }

    let video_stream_index = source
        .video_stream_index
        .ok_or(ShotscribeError::NoVideoStream)?;

    log::debug!(
        "Detecting shot boundaries (stream={}, threshold={})",
        video_stream_index,
        options.threshold
    );

    let stream = source
        .input_context
        .stream(video_stream_index)
        .ok_or(ShotscribeError::NoVideoStream)?;
    let time_base = stream.time_base();
    let codec_parameters = stream.parameters();
    let decoder_context = CodecContext::from_parameters(codec_parameters)?;
    let mut decoder = decoder_context.decoder().video()?;

    let frames_per_second = video.frames_per_second;
    let max_timestamp = options
        .max_duration
        .map(|duration| conversion::duration_to_stream_timestamp(duration, time_base));

    let mut boundaries = Vec::new();
    let mut decoded_frame = VideoFrame::empty();
    let mut filtered_frame = VideoFrame::empty();

    // Discover the actual decoded pixel format by decoding the first frame.
    // The decoder's reported format before decoding may differ from the
    // real output (e.g. codec parameters say YUYV422 but output is YUV420P).
    // We still probe to get a reasonable starting format for the buffer
    // filter, but a `format` filter in the chain normalises any mid-stream
    // pixel-format changes to YUV420P before they reach `scdet`.
    let mut actual_pix_fmt: Option<i32> = None;

    'probe: for (stream, packet) in source.input_context.packets() {
        if stream.index() != video_stream_index {
            continue;
        }

        decoder
            .send_packet(&packet)
            .map_err(|error| ShotscribeError::DecodeError(error.to_string()))?;

        if decoder.receive_frame(&mut decoded_frame).is_ok() {
            actual_pix_fmt = Some(AVPixelFormat::from(decoded_frame.format()) as i32);
            break 'probe;
        }
    }

    let pix_fmt = actual_pix_fmt.unwrap_or(AVPixelFormat::from(decoder.format()) as i32);

    // Read colorspace and color range from the probed frame so the buffer
    // filter matches the decoded frame properties exactly. We read the raw
    // AVFrame fields directly because the safe Rust enum accessors have the
    // same discriminant-mismatch problem as Pixel.
    let (color_space, color_range) = if actual_pix_fmt.is_some() {
        unsafe {
            let ptr = decoded_frame.as_ptr();
            ((*ptr).colorspace as i32, (*ptr).color_range as i32)
        }
    } else {
        (2, 0) // AVCOL_SPC_UNSPECIFIED, AVCOL_RANGE_UNSPECIFIED
    };

    // Build the filter graph: buffer → scale → format → scdet → buffersink
    //
    // The `format` filter normalises all frames to YUV420P. This is
    // necessary because some decoders change their output pixel format
    // mid-stream (e.g. first frame as YUV422P, subsequent as YUV420P),
    // which would cause the filter chain to reject frames with a
    // "Changing video frame properties on the fly" error.
    let mut graph = FilterGraph::new();

    let buffer_args = format!(
        "video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect=1/1:colorspace={}:range={}",
        decoder.width(),
        decoder.height(),
        pix_fmt,
        time_base.numerator(),
        time_base.denominator(),
        color_space,
        color_range,
    );

    graph
        .add(
            &ffmpeg_next::filter::find("buffer").ok_or_else(|| {
                ShotscribeError::FilterGraphError("FFmpeg 'buffer' filter not found".to_string())
            })?,
            "in",
            &buffer_args,
        )
        .map_err(|error| {
            ShotscribeError::FilterGraphError(format!("Failed to add buffer filter: {error}"))
        })?;

    graph
        .add(
            &ffmpeg_next::filter::find("buffersink").ok_or_else(|| {
                ShotscribeError::FilterGraphError(
                    "FFmpeg 'buffersink' filter not found".to_string(),
                )
            })?,
            "out",
            "",
        )
        .map_err(|error| {
            ShotscribeError::FilterGraphError(format!("Failed to add buffersink filter: {error}"))
        })?;

    let scdet_spec = format!(
        "scale=320:-1,format=pix_fmts=yuv420p,scdet=threshold={}",
        options.threshold
    );
    graph
        .output("in", 0)
        .map_err(|error| {
            ShotscribeError::FilterGraphError(format!("Filter graph output error: {error}"))
        })?
        .input("out", 0)
        .map_err(|error| {
            ShotscribeError::FilterGraphError(format!("Filter graph input error: {error}"))
        })?
        .parse(&scdet_spec)
        .map_err(|error| {
            ShotscribeError::FilterGraphError(format!("Filter graph parse error: {error}"))
        })?;

    graph.validate().map_err(|error| {
        ShotscribeError::FilterGraphError(format!("Filter graph validation: {error}"))
    })?;

    // Helper: feed a decoded frame through the filter graph and collect cuts.
    let mut feed_and_collect = |graph: &mut FilterGraph,
                                frame: &VideoFrame,
                                boundaries: &mut Vec<ShotBoundary>|
     -> Result<(), ShotscribeError> {
        graph
            .get("in")
            .ok_or_else(|| {
                ShotscribeError::FilterGraphError("Filter 'in' not found".to_string())
            })?
            .source()
            .add(frame)
            .map_err(|error| {
                ShotscribeError::FilterGraphError(format!("Failed to feed filter: {error}"))
            })?;

        while graph
            .get("out")
            .ok_or_else(|| {
                ShotscribeError::FilterGraphError("Filter 'out' not found".to_string())
            })?
            .sink()
            .frame(&mut filtered_frame)
            .is_ok()
        {
            let score = read_scdet_score(&filtered_frame);
            if let Some(score) = score.filter(|&s| s >= options.threshold) {
                let pts = filtered_frame.pts().unwrap_or(0);
                let timestamp =
                    Duration::from_secs_f64(conversion::pts_to_seconds(pts, time_base).max(0.0));
                let frame_number =
                    conversion::pts_to_frame_number(pts, time_base, frames_per_second);
                boundaries.push(ShotBoundary {
                    timestamp,
                    frame_number,
                    score,
                });

                if options
                    .max_boundaries
                    .is_some_and(|max_boundaries| boundaries.len() >= max_boundaries)
                {
                    return Ok(());
                }
            }
        }
        Ok(())
    };

    // Feed the first frame we already decoded (still in decoded_frame).
    if actual_pix_fmt.is_some() {
        feed_and_collect(&mut graph, &decoded_frame, &mut boundaries)?;

        // The decoder may still have buffered frames from the first packet.
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            feed_and_collect(&mut graph, &decoded_frame, &mut boundaries)?;
        }
    }

    // Process remaining packets.
    for (stream, packet) in source.input_context.packets() {
        if pipeline.is_cancelled() {
            return Err(ShotscribeError::Cancelled);
        }

        if stream.index() != video_stream_index {
            continue;
        }

        if let Some(max_pts) = max_timestamp
            && packet.pts().is_some_and(|pts| pts > max_pts)
        {
            break;
        }

        decoder
            .send_packet(&packet)
            .map_err(|error| ShotscribeError::DecodeError(error.to_string()))?;

        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if let Some(max_pts) = max_timestamp
                && decoded_frame.pts().is_some_and(|pts| pts > max_pts)
            {
                return Ok(boundaries);
            }
            feed_and_collect(&mut graph, &decoded_frame, &mut boundaries)?;
        }
    }

    // Flush the decoder.
    let _ = decoder.send_eof();
    while decoder.receive_frame(&mut decoded_frame).is_ok() {
        if let Some(max_pts) = max_timestamp
            && decoded_frame.pts().is_some_and(|pts| pts > max_pts)
        {
            break;
        }
        let _ = feed_and_collect(&mut graph, &decoded_frame, &mut boundaries);
    }

    // Drain remaining filter output.
    while graph
        .get("out")
        .map(|mut f| f.sink().frame(&mut filtered_frame).is_ok())
        .unwrap_or(false)
    {
        let score = read_scdet_score(&filtered_frame);
        if let Some(score) = score.filter(|&s| s >= options.threshold) {
            let pts = filtered_frame.pts().unwrap_or(0);
            let timestamp =
                Duration::from_secs_f64(conversion::pts_to_seconds(pts, time_base).max(0.0));
            let frame_number = conversion::pts_to_frame_number(pts, time_base, frames_per_second);

            boundaries.push(ShotBoundary {
                timestamp,
                frame_number,
                score,
            });

            if options
                .max_boundaries
                .is_some_and(|max_boundaries| boundaries.len() >= max_boundaries)
            {
                break;
            }
        }
    }

    Ok(boundaries)
}

/// Fast boundary detection using packet keyframes only.
///
/// This avoids full-frame decode and is suitable for long videos where
/// approximate boundaries are acceptable.
fn detect_boundaries_from_keyframes(
    source: &mut VideoSource,
    video: &VideoStreamInfo,
    options: &SegmentationOptions,
    pipeline: &PipelineOptions,
) -> Result<Vec<ShotBoundary>, ShotscribeError> {
    let video_stream_index = source
        .video_stream_index
        .ok_or(ShotscribeError::NoVideoStream)?;

    log::debug!(
        "Detecting shot boundaries from keyframes (stream={}, max_duration={:?}, max_boundaries={:?})",
        video_stream_index,
        options.max_duration,
        options.max_boundaries,
    );

    let time_base = source
        .input_context
        .stream(video_stream_index)
        .ok_or(ShotscribeError::NoVideoStream)?
        .time_base();

    let max_stream_timestamp = options
        .max_duration
        .map(|duration| conversion::duration_to_stream_timestamp(duration, time_base));

    let mut boundaries = Vec::new();
    let mut video_packet_number: u64 = 0;
    let mut packet = Packet::empty();

    loop {
        if pipeline.is_cancelled() {
            return Err(ShotscribeError::Cancelled);
        }

        match packet.read(&mut source.input_context) {
            Ok(()) => {
                if packet.stream() as usize != video_stream_index {
                    continue;
                }

                if let Some(max_pts) = max_stream_timestamp
                    && packet.pts().is_some_and(|pts| pts > max_pts)
                {
                    break;
                }

                if packet.is_key() {
                    // Skip the very first key packet (start-of-stream marker).
                    if video_packet_number > 0 {
                        let pts = packet.pts().unwrap_or(0);
                        let timestamp = Duration::from_secs_f64(
                            conversion::pts_to_seconds(pts, time_base).max(0.0),
                        );
                        let frame_number = conversion::pts_to_frame_number(
                            pts,
                            time_base,
                            video.frames_per_second,
                        );

                        boundaries.push(ShotBoundary {
                            timestamp,
                            frame_number,
                            // Sentinel score to indicate keyframe-derived boundary.
                            score: 100.0,
                        });

                        if options
                            .max_boundaries
                            .is_some_and(|max| boundaries.len() >= max)
                        {
                            break;
                        }
                    }
                }

                video_packet_number += 1;
            }
            Err(FfmpegError::Eof) => break,
            Err(error) => return Err(ShotscribeError::from(error)),
        }
    }

    Ok(boundaries)
}

/// Read the `lavfi.scd.score` metadata value from a filtered frame.
///
/// The `scdet` filter adds this key to frames where it detects a scene change.
/// Returns `None` for frames without the key (i.e. not a shot boundary).
fn read_scdet_score(frame: &VideoFrame) -> Option<f64> {
    // SAFETY: We access the frame's metadata dictionary via ffmpeg_sys_next
    // because ffmpeg-next's safe API does not expose per-frame metadata.
    unsafe {
        let frame_ptr = frame.as_ptr();
        if frame_ptr.is_null() {
            return None;
        }

        let metadata = (*frame_ptr).metadata;
        if metadata.is_null() {
            return None;
        }

        let key = c"lavfi.scd.score";
        let entry = ffmpeg_sys_next::av_dict_get(metadata, key.as_ptr(), std::ptr::null(), 0);

        if entry.is_null() {
            return None;
        }

        let value_ptr = (*entry).value;
        if value_ptr.is_null() {
            return None;
        }

        let value_cstr = CStr::from_ptr(value_ptr);
        value_cstr.to_str().ok()?.parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(frame_number: u64) -> ShotBoundary {
        ShotBoundary {
            timestamp: Duration::from_secs_f64(frame_number as f64 / 25.0),
            frame_number,
            score: 50.0,
        }
    }

    #[test]
    fn min_gap_zero_keeps_everything() {
        let cuts = vec![boundary(1), boundary(2), boundary(3)];
        assert_eq!(enforce_min_gap(cuts, 0).len(), 3);
    }

    #[test]
    fn min_gap_merges_rapid_cuts() {
        let cuts = vec![boundary(5), boundary(30), boundary(32), boundary(60)];
        let kept = enforce_min_gap(cuts, 25);
        let frames: Vec<u64> = kept.iter().map(|b| b.frame_number).collect();
        // Frame 5 is too close to frame 0; 32 is too close to 30.
        assert_eq!(frames, vec![30, 60]);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        assert!(SegmentationOptions::new().threshold(150.0).validate().is_err());
        assert!(SegmentationOptions::new().threshold(-1.0).validate().is_err());
        assert!(SegmentationOptions::new().threshold(25.0).validate().is_ok());
    }

    #[test]
    fn builder_chains() {
        let options = SegmentationOptions::new()
            .threshold(20.0)
            .mode(BoundaryDetectionMode::Keyframes)
            .max_duration(Duration::from_secs(60))
            .max_boundaries(10)
            .min_shot_duration(Duration::from_secs(1));
        assert_eq!(options.threshold, 20.0);
        assert_eq!(options.mode, BoundaryDetectionMode::Keyframes);
        assert_eq!(options.max_duration, Some(Duration::from_secs(60)));
        assert_eq!(options.max_boundaries, Some(10));
        assert_eq!(options.min_shot_duration, Some(Duration::from_secs(1)));
    }
}
