//! Representative-frame selection.
//!
//! Each shot gets one representative still that annotators look at and the
//! exporter writes into the thumbnail bundle. The default picks the middle
//! frame of the shot; `Sharpest` samples several frames across the span and
//! keeps the one with the most visual detail, so a shot that opens on a
//! fade-to-black still gets a usable thumbnail.

use image::{DynamicImage, imageops::FilterType};

use crate::{
    configuration::PipelineOptions,
    error::ShotscribeError,
    progress::{OperationType, ProgressTracker},
    shot::{Shot, ShotList},
    source::VideoSource,
};

/// How the representative frame of a shot is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillStrategy {
    /// The frame in the middle of the shot span. This is the default.
    Middle,
    /// Sample `samples` frames evenly across the shot and keep the one with
    /// the highest pixel variance (most visual detail).
    Sharpest {
        /// Number of frames to sample within the shot.
        samples: u32,
    },
}

impl Default for StillStrategy {
    fn default() -> Self {
        StillStrategy::Middle
    }
}

/// Still extraction settings.
#[derive(Debug, Clone)]
#[must_use]
pub struct StillOptions {
    /// Selection strategy.
    pub strategy: StillStrategy,
    /// Maximum dimension (longest edge) of the extracted still in pixels.
    ///
    /// The other dimension is computed to preserve aspect ratio.
    /// Default: 640.
    pub max_dimension: u32,
}

impl Default for StillOptions {
    fn default() -> Self {
        Self {
            strategy: StillStrategy::Middle,
            max_dimension: 640,
        }
    }
}

impl StillOptions {
    /// Create new still options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection strategy.
    pub fn strategy(mut self, strategy: StillStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the maximum dimension of the extracted still.
    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

/// A shot's extracted representative still.
#[derive(Debug)]
pub struct ShotStill {
    /// Index of the shot this still belongs to.
    pub shot_index: usize,
    /// Frame number the still was decoded from.
    pub frame_number: u64,
    /// The decoded, scaled image.
    pub image: DynamicImage,
}

/// Pick and decode the representative frame for a single shot.
///
/// Returns the chosen frame number and the scaled image.
///
/// # Errors
///
/// Returns [`ShotscribeError::NoVideoStream`] if the file has no video, or
/// decoding errors.
pub fn pick_still(
    source: &mut VideoSource,
    shot: &Shot,
    options: &StillOptions,
) -> Result<(u64, DynamicImage), ShotscribeError> {
    let frame_number = match options.strategy {
        StillStrategy::Middle => shot.middle_frame(),
        StillStrategy::Sharpest { samples } => sharpest_frame(source, shot, samples)?,
    };

    log::debug!(
        "Decoding still for {} (frame {}, strategy {:?})",
        shot.id(),
        frame_number,
        options.strategy,
    );

    let image = source.frames().frame(frame_number)?;
    let (width, height) = (image.width(), image.height());
    let (still_width, still_height) = fit_dimensions(width, height, options.max_dimension);
    let scaled = image.resize_exact(still_width, still_height, FilterType::Triangle);

    Ok((frame_number, scaled))
}

/// Pick and decode representative frames for every shot in the list.
///
/// Records each chosen frame on the corresponding [`Shot`] and reports
/// progress through `pipeline`.
///
/// # Errors
///
/// Returns [`ShotscribeError::Cancelled`] if the pipeline's cancellation
/// token fires, or any single-shot error.
pub fn pick_stills(
    source: &mut VideoSource,
    shots: &mut ShotList,
    options: &StillOptions,
    pipeline: &PipelineOptions,
) -> Result<Vec<ShotStill>, ShotscribeError> {
    let mut tracker = ProgressTracker::new(
        pipeline.progress_callback(),
        OperationType::StillExtraction,
        Some(shots.len() as u64),
        pipeline.batch_size(),
    );

    let mut stills = Vec::with_capacity(shots.len());
    let snapshots: Vec<Shot> = shots.iter().cloned().collect();

    for (shot_index, shot) in snapshots.into_iter().enumerate() {
        if pipeline.is_cancelled() {
            return Err(ShotscribeError::Cancelled);
        }

        let (frame_number, image) = pick_still(source, &shot, options)?;
        shots.set_representative(shot_index, frame_number)?;
        tracker.advance(Some(frame_number), Some(shot.start_time));

        stills.push(ShotStill {
            shot_index,
            frame_number,
            image,
        });
    }

    tracker.finish();
    Ok(stills)
}

/// Find the highest-variance frame among `samples` evenly spaced frames of
/// the shot.
fn sharpest_frame(
    source: &mut VideoSource,
    shot: &Shot,
    samples: u32,
) -> Result<u64, ShotscribeError> {
    let span = shot.frame_count();
    let count = (samples.max(1) as u64).min(span);
    let step = span / count;

    let mut best_frame = shot.middle_frame();
    let mut best_variance: f64 = -1.0;

    for sample_index in 0..count {
        let frame_number = shot.start_frame + sample_index * step.max(1);
        if frame_number > shot.end_frame {
            break;
        }
        let image = source.frames().frame(frame_number)?;
        let variance = pixel_variance(&image);
        if variance > best_variance {
            best_variance = variance;
            best_frame = frame_number;
        }
    }

    Ok(best_frame)
}

/// Compute dimensions that fit within `max_dimension` preserving aspect ratio.
pub(crate) fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_dimension, max_dimension);
    }
    if width.max(height) <= max_dimension {
        return (width, height);
    }
    let scale = max_dimension as f64 / width.max(height) as f64;
    let new_width = ((width as f64) * scale).round() as u32;
    let new_height = ((height as f64) * scale).round() as u32;
    (new_width.max(1), new_height.max(1))
}

/// Compute the pixel variance of an image (higher = more visual detail).
///
/// Uses the grayscale luminance for speed. Returns the variance of pixel
/// values across the entire image.
pub(crate) fn pixel_variance(image: &DynamicImage) -> f64 {
    let gray = image.to_luma8();
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    let count = pixels.len() as f64;
    let mean: f64 = pixels.iter().map(|&p| p as f64).sum::<f64>() / count;
    pixels
        .iter()
        .map(|&p| {
            let diff = p as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / count
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn fit_dimensions_preserves_aspect_ratio() {
        assert_eq!(fit_dimensions(1920, 1080, 640), (640, 360));
        assert_eq!(fit_dimensions(1080, 1920, 640), (360, 640));
    }

    #[test]
    fn fit_dimensions_never_upscales() {
        assert_eq!(fit_dimensions(320, 180, 640), (320, 180));
    }

    #[test]
    fn fit_dimensions_handles_degenerate_input() {
        assert_eq!(fit_dimensions(0, 0, 640), (640, 640));
    }

    #[test]
    fn variance_distinguishes_flat_from_detailed() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            16,
            16,
            image::Rgb([128, 128, 128]),
        ));
        assert_eq!(pixel_variance(&flat), 0.0);

        let detailed = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        }));
        assert!(pixel_variance(&detailed) > 1000.0);
    }

    #[test]
    fn options_builder_chains() {
        let options = StillOptions::new()
            .strategy(StillStrategy::Sharpest { samples: 7 })
            .max_dimension(320);
        assert_eq!(options.strategy, StillStrategy::Sharpest { samples: 7 });
        assert_eq!(options.max_dimension, 320);
    }
}
