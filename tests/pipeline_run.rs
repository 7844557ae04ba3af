//! End-to-end pipeline integration tests.
//!
//! Tests require fixture files under `tests/fixtures/`; each test
//! early-returns when the fixture is absent.

use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use shotscribe::{
    AnnotationPipeline, CancellationToken, DetailAnnotator, LuminanceAnnotator, PipelineOptions,
    ProgressCallback, ProgressInfo, SegmentationOptions, ShotscribeError, export,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

struct CountProgress {
    reports: AtomicU64,
}

impl ProgressCallback for CountProgress {
    fn on_progress(&self, _info: &ProgressInfo) {
        self.reports.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn full_run_annotates_every_shot() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let pipeline = AnnotationPipeline::new()
        .add_annotator(Box::new(LuminanceAnnotator::default()))
        .add_annotator(Box::new(DetailAnnotator::default()));

    let output = pipeline.run(path).expect("pipeline run failed");

    assert!(!output.video.shots.is_empty());
    assert_eq!(output.stills.len(), output.video.shots.len());

    for shot in output.video.shots.iter() {
        let frame = shot.representative_frame.expect("still picked");
        assert!(frame >= shot.start_frame && frame <= shot.end_frame);
        // One annotation per detector.
        assert_eq!(shot.annotations.len(), 2);
    }

    assert!(output.video.pace.is_some());
}

#[test]
fn run_reports_progress() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let progress = Arc::new(CountProgress {
        reports: AtomicU64::new(0),
    });
    let pipeline = AnnotationPipeline::new()
        .add_annotator(Box::new(LuminanceAnnotator::default()))
        .with_options(PipelineOptions::new().with_progress(progress.clone()));

    pipeline.run(path).expect("pipeline run failed");
    assert!(progress.reports.load(Ordering::Relaxed) > 0);
}

#[test]
fn cancelled_token_aborts_the_run() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let token = CancellationToken::new();
    token.cancel();

    let pipeline = AnnotationPipeline::new()
        .with_options(PipelineOptions::new().with_cancellation(token));

    assert!(matches!(
        pipeline.run(path),
        Err(ShotscribeError::Cancelled)
    ));
}

#[test]
fn exported_csv_matches_the_run() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let pipeline = AnnotationPipeline::new()
        .with_segmentation(SegmentationOptions::default())
        .add_annotator(Box::new(LuminanceAnnotator::default()));
    let output = pipeline.run(path).expect("pipeline run failed");

    let mut buffer = Vec::new();
    export::write_shots_csv(&mut buffer, std::slice::from_ref(&output.video))
        .expect("csv export failed");
    let csv = String::from_utf8(buffer).expect("utf-8 csv");

    // Header plus one row per shot.
    assert_eq!(csv.lines().count(), output.video.shots.len() + 1);
    assert!(csv.lines().next().unwrap().contains("luminance"));
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_run_matches_sequential_shot_structure() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let pipeline = AnnotationPipeline::new()
        .add_annotator(Box::new(LuminanceAnnotator::default()));

    let sequential = pipeline.run(path).expect("sequential run failed");
    let parallel = pipeline.run_parallel(path).expect("parallel run failed");

    assert_eq!(sequential.video.shots.len(), parallel.video.shots.len());
    for (a, b) in sequential
        .video
        .shots
        .iter()
        .zip(parallel.video.shots.iter())
    {
        assert_eq!(a.start_frame, b.start_frame);
        assert_eq!(a.end_frame, b.end_frame);
        assert_eq!(a.annotations.len(), b.annotations.len());
    }
}
