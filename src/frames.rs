//! Single-frame decoding.
//!
//! This module provides [`FrameGrabber`] for decoding individual still
//! frames out of a video. The still picker uses it to materialize each
//! shot's representative frame. Decoded frames are returned as
//! [`image::DynamicImage`] values in RGB8 format.

use std::time::Duration;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{conversion, error::ShotscribeError, source::VideoSource};

/// Frame decoding operations.
///
/// Obtained via [`VideoSource::frames`]. Each decode creates a fresh
/// decoder, seeks to the nearest keyframe before the target, and decodes
/// forward until the requested frame is reached. The decoder is dropped
/// when the method returns.
pub struct FrameGrabber<'a> {
    pub(crate) source: &'a mut VideoSource,
}

impl FrameGrabber<'_> {
    /// Decode a single frame by frame number (0-indexed).
    ///
    /// # Errors
    ///
    /// - [`ShotscribeError::NoVideoStream`] if the file has no video.
    /// - [`ShotscribeError::FrameOutOfRange`] if `frame_number` exceeds the
    ///   frame count.
    /// - [`ShotscribeError::DecodeError`] if decoding fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shotscribe::VideoSource;
    ///
    /// let mut source = VideoSource::open("input.mp4")?;
    /// let frame = source.frames().frame(100)?;
    /// frame.save("frame_100.png")?;
    /// # Ok::<(), shotscribe::ShotscribeError>(())
    /// ```
    pub fn frame(&mut self, frame_number: u64) -> Result<DynamicImage, ShotscribeError> {
        let video_stream_index = self
            .source
            .video_stream_index
            .ok_or(ShotscribeError::NoVideoStream)?;

        let video = self
            .source
            .metadata
            .video
            .as_ref()
            .ok_or(ShotscribeError::NoVideoStream)?;

        let total_frames = video.frame_count;
        let frames_per_second = video.frames_per_second;
        let target_width = video.width;
        let target_height = video.height;

        if total_frames > 0 && frame_number >= total_frames {
            return Err(ShotscribeError::FrameOutOfRange {
                frame_number,
                total_frames,
            });
        }

        // Build a fresh decoder from the stream parameters.
        let stream = self
            .source
            .input_context
            .stream(video_stream_index)
            .ok_or(ShotscribeError::NoVideoStream)?;
        let time_base = stream.time_base();
        let codec_parameters = stream.parameters();
        let decoder_context = CodecContext::from_parameters(codec_parameters)?;
        let mut decoder = decoder_context.decoder().video()?;

        // Pixel-format converter (source format → RGB24).
        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            target_width,
            target_height,
            ScalingFlags::BILINEAR,
        )?;

        // Seek to the nearest keyframe before the target frame. The seek
        // target is in AV_TIME_BASE because we seek at container level.
        let seek_timestamp =
            conversion::frame_number_to_seek_timestamp(frame_number, frames_per_second);
        self.source
            .input_context
            .seek(seek_timestamp, ..seek_timestamp)?;

        // Decode forward until we reach the target.
        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in self.source.input_context.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            decoder
                .send_packet(&packet)
                .map_err(|error| ShotscribeError::DecodeError(error.to_string()))?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.pts().unwrap_or(0);
                let current_frame_number =
                    conversion::pts_to_frame_number(pts, time_base, frames_per_second);

                // Return the requested frame, or the closest frame after it
                // when the exact index does not exist at this position.
                if current_frame_number >= frame_number {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return convert_frame_to_image(&rgb_frame, target_width, target_height);
                }
            }
        }

        // Flush the decoder.
        decoder.send_eof().ok();
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.pts().unwrap_or(0);
            let current_frame_number =
                conversion::pts_to_frame_number(pts, time_base, frames_per_second);

            if current_frame_number >= frame_number {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return convert_frame_to_image(&rgb_frame, target_width, target_height);
            }
        }

        Err(ShotscribeError::DecodeError(format!(
            "Could not locate frame {frame_number} in the video stream"
        )))
    }

    /// Decode a single frame at a specific timestamp.
    ///
    /// Converts the timestamp to a frame number using the video's frame rate
    /// and delegates to [`frame`](FrameGrabber::frame).
    ///
    /// # Errors
    ///
    /// Returns [`ShotscribeError::InvalidTimestamp`] if the timestamp exceeds
    /// the video duration, or any error from [`frame`](FrameGrabber::frame).
    pub fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ShotscribeError> {
        let duration = self.source.metadata.duration;
        if timestamp > duration {
            return Err(ShotscribeError::InvalidTimestamp(timestamp));
        }

        let frames_per_second = self
            .source
            .metadata
            .video
            .as_ref()
            .ok_or(ShotscribeError::NoVideoStream)?
            .frames_per_second;

        let frame_number = conversion::timestamp_to_frame_number(timestamp, frames_per_second);
        self.frame(frame_number)
    }
}

/// Convert a scaled RGB24 frame into an [`image::DynamicImage`].
fn convert_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, ShotscribeError> {
    let buffer = conversion::frame_to_buffer(rgb_frame, width, height, 3);
    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ShotscribeError::DecodeError(format!(
            "Frame buffer did not match expected {width}x{height} RGB dimensions"
        ))
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}
