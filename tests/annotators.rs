//! Detector integration tests on synthetic stills.

use std::time::Duration;

use image::{DynamicImage, RgbImage};
use shotscribe::{Annotator, DetailAnnotator, LuminanceAnnotator, Shot};

fn synthetic_shot() -> Shot {
    Shot {
        video_id: "synthetic".to_string(),
        index: 3,
        start_frame: 75,
        end_frame: 99,
        start_time: Duration::from_secs(3),
        end_time: Duration::from_secs(4),
        boundary_score: 31.0,
        representative_frame: Some(87),
        annotations: Vec::new(),
    }
}

fn solid(value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 36, image::Rgb([value, value, value])))
}

fn checkerboard() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(64, 36, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgb([10, 10, 10])
        } else {
            image::Rgb([245, 245, 245])
        }
    }))
}

#[test]
fn luminance_detector_labels_extremes() {
    let detector = LuminanceAnnotator::default();
    let shot = synthetic_shot();

    let black = detector.annotate(&shot, &solid(0)).unwrap();
    assert_eq!(black.len(), 1);
    assert_eq!(black[0].label, "dark");
    assert_eq!(black[0].confidence, 1.0);

    let white = detector.annotate(&shot, &solid(255)).unwrap();
    assert_eq!(white[0].label, "bright");
    assert_eq!(white[0].confidence, 1.0);
}

#[test]
fn luminance_confidence_drops_toward_class_borders() {
    let detector = LuminanceAnnotator::default();
    let shot = synthetic_shot();

    let deep_dark = detector.annotate(&shot, &solid(5)).unwrap();
    let near_border = detector.annotate(&shot, &solid(55)).unwrap();
    assert_eq!(near_border[0].label, "dark");
    assert!(deep_dark[0].confidence > near_border[0].confidence);
}

#[test]
fn detail_detector_separates_flat_and_busy_stills() {
    let detector = DetailAnnotator::default();
    let shot = synthetic_shot();

    let flat = detector.annotate(&shot, &solid(128)).unwrap();
    assert_eq!(flat[0].label, "flat");

    let busy = detector.annotate(&shot, &checkerboard()).unwrap();
    assert_eq!(busy[0].label, "detailed");
    assert_eq!(busy[0].confidence, 1.0);
}

#[test]
fn detectors_report_their_ids() {
    let shot = synthetic_shot();
    let image = solid(128);

    for (detector, expected) in [
        (
            Box::new(LuminanceAnnotator::default()) as Box<dyn Annotator>,
            "luminance",
        ),
        (Box::new(DetailAnnotator::default()), "detail"),
    ] {
        assert_eq!(detector.id(), expected);
        let annotations = detector.annotate(&shot, &image).unwrap();
        assert!(
            annotations
                .iter()
                .all(|annotation| annotation.detector == expected)
        );
    }
}
