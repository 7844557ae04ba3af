//! Per-shot content annotation.
//!
//! This module defines the [`Annotation`] record, the [`Annotator`] trait
//! detectors implement, and two built-in image heuristics. Detectors only
//! ever see a shot's representative still — they never decode video
//! themselves — so a detector is just a pure function from image to labels.
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use shotscribe::{Annotator, LuminanceAnnotator};
//! # use shotscribe::{Shot};
//! # use std::time::Duration;
//! # let shot = Shot {
//! #     video_id: "clip".into(), index: 0, start_frame: 0, end_frame: 24,
//! #     start_time: Duration::ZERO, end_time: Duration::from_secs(1),
//! #     boundary_score: 0.0, representative_frame: Some(12), annotations: vec![],
//! # };
//!
//! let detector = LuminanceAnnotator::default();
//! let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([250, 250, 250])));
//! let annotations = detector.annotate(&shot, &image).unwrap();
//! assert_eq!(annotations[0].label, "bright");
//! ```

use image::DynamicImage;
use serde::Serialize;

use crate::{error::ShotscribeError, shot::Shot, still::pixel_variance};

/// A structured label attached to a shot.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    /// The label text.
    pub label: String,
    /// Confidence in the label, in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Identifier of the detector that produced this annotation.
    ///
    /// Detector identifiers key the per-detector columns in CSV export, so
    /// two detectors must never share one.
    pub detector: String,
}

/// A content detector that labels shots from their representative stills.
///
/// Implementations must be [`Send`] and [`Sync`] so shots can be fanned out
/// across worker threads. A detector may return any number of annotations
/// for a shot, including none.
pub trait Annotator: Send + Sync {
    /// Stable identifier for this detector.
    fn id(&self) -> &str;

    /// Label one shot given its representative still.
    fn annotate(
        &self,
        shot: &Shot,
        image: &DynamicImage,
    ) -> Result<Vec<Annotation>, ShotscribeError>;
}

/// Classifies shots by mean luminance: `dark`, `normal`, or `bright`.
///
/// Confidence is 0.5 at a class border and approaches 1.0 toward the
/// extreme of the class.
#[derive(Debug, Clone)]
pub struct LuminanceAnnotator {
    /// Mean luma below which a shot is `dark`. Default: 60.
    pub dark_below: f64,
    /// Mean luma above which a shot is `bright`. Default: 190.
    pub bright_above: f64,
}

impl Default for LuminanceAnnotator {
    fn default() -> Self {
        Self {
            dark_below: 60.0,
            bright_above: 190.0,
        }
    }
}

impl Annotator for LuminanceAnnotator {
    fn id(&self) -> &str {
        "luminance"
    }

    fn annotate(
        &self,
        _shot: &Shot,
        image: &DynamicImage,
    ) -> Result<Vec<Annotation>, ShotscribeError> {
        let mean = mean_luma(image);

        let (label, confidence) = if mean < self.dark_below {
            let confidence = 0.5 + 0.5 * (self.dark_below - mean) / self.dark_below;
            ("dark", confidence)
        } else if mean > self.bright_above {
            let headroom = (255.0 - self.bright_above).max(1.0);
            let confidence = 0.5 + 0.5 * (mean - self.bright_above) / headroom;
            ("bright", confidence)
        } else {
            // Distance to the nearest border, normalised to half the band.
            let half_band = (self.bright_above - self.dark_below) / 2.0;
            let distance = (mean - self.dark_below).min(self.bright_above - mean);
            let confidence = if half_band > 0.0 {
                0.5 + 0.5 * (distance / half_band)
            } else {
                0.5
            };
            ("normal", confidence)
        };

        Ok(vec![Annotation {
            label: label.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            detector: self.id().to_string(),
        }])
    }
}

/// Classifies shots by grayscale pixel variance: `flat` or `detailed`.
///
/// Uses the same variance signal as the sharpest-frame still picker, so a
/// shot labelled `flat` is one where even the best still carries little
/// visual information (title cards, fades, solid color inserts).
#[derive(Debug, Clone)]
pub struct DetailAnnotator {
    /// Variance below which a shot is `flat`. Default: 100.
    pub flat_below: f64,
}

impl Default for DetailAnnotator {
    fn default() -> Self {
        Self { flat_below: 100.0 }
    }
}

impl Annotator for DetailAnnotator {
    fn id(&self) -> &str {
        "detail"
    }

    fn annotate(
        &self,
        _shot: &Shot,
        image: &DynamicImage,
    ) -> Result<Vec<Annotation>, ShotscribeError> {
        let variance = pixel_variance(image);

        let (label, confidence) = if variance < self.flat_below {
            let confidence = if self.flat_below > 0.0 {
                0.5 + 0.5 * (self.flat_below - variance) / self.flat_below
            } else {
                0.5
            };
            ("flat", confidence)
        } else {
            // Variance has no upper bound; saturate at 4x the border.
            let confidence = 0.5 + 0.5 * ((variance / self.flat_below - 1.0) / 3.0).min(1.0);
            ("detailed", confidence)
        };

        Ok(vec![Annotation {
            label: label.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            detector: self.id().to_string(),
        }])
    }
}

/// Mean grayscale luminance of an image in `[0, 255]`.
fn mean_luma(image: &DynamicImage) -> f64 {
    let gray = image.to_luma8();
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    pixels.iter().map(|&p| p as f64).sum::<f64>() / pixels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::time::Duration;

    fn test_shot() -> Shot {
        Shot {
            video_id: "clip".to_string(),
            index: 0,
            start_frame: 0,
            end_frame: 24,
            start_time: Duration::ZERO,
            end_time: Duration::from_secs(1),
            boundary_score: 0.0,
            representative_frame: Some(12),
            annotations: Vec::new(),
        }
    }

    fn solid(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, image::Rgb([value, value, value])))
    }

    #[test]
    fn luminance_classes() {
        let detector = LuminanceAnnotator::default();
        let shot = test_shot();

        let dark = detector.annotate(&shot, &solid(10)).unwrap();
        assert_eq!(dark[0].label, "dark");
        assert!(dark[0].confidence > 0.5);

        let normal = detector.annotate(&shot, &solid(125)).unwrap();
        assert_eq!(normal[0].label, "normal");

        let bright = detector.annotate(&shot, &solid(250)).unwrap();
        assert_eq!(bright[0].label, "bright");
        assert!(bright[0].confidence > 0.9);

        for result in [&dark, &normal, &bright] {
            assert_eq!(result[0].detector, "luminance");
            assert!((0.0..=1.0).contains(&result[0].confidence));
        }
    }

    #[test]
    fn detail_classes() {
        let detector = DetailAnnotator::default();
        let shot = test_shot();

        let flat = detector.annotate(&shot, &solid(128)).unwrap();
        assert_eq!(flat[0].label, "flat");
        assert_eq!(flat[0].confidence, 1.0);

        let noisy = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        }));
        let detailed = detector.annotate(&shot, &noisy).unwrap();
        assert_eq!(detailed[0].label, "detailed");
        assert!(detailed[0].confidence > 0.5);
    }
}
