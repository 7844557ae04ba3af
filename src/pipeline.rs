//! Pipeline orchestration.
//!
//! [`AnnotationPipeline`] wires the stages together: ingest a video,
//! detect shot boundaries, assemble the shot list, pick representative
//! stills, run every configured detector over them, and compute pace
//! statistics. The result is an [`AnnotatedVideo`] ready for export.
//!
//! # Example
//!
//! ```no_run
//! use shotscribe::{
//!     AnnotationPipeline, DetailAnnotator, LuminanceAnnotator, ShotscribeError,
//! };
//!
//! let pipeline = AnnotationPipeline::new()
//!     .add_annotator(Box::new(LuminanceAnnotator::default()))
//!     .add_annotator(Box::new(DetailAnnotator::default()));
//!
//! let output = pipeline.run("input.mp4")?;
//! println!(
//!     "{}: {} shots",
//!     output.video.metadata.id,
//!     output.video.shots.len()
//! );
//! # Ok::<(), ShotscribeError>(())
//! ```

use std::path::Path;

use crate::{
    annotate::Annotator,
    boundary::SegmentationOptions,
    configuration::PipelineOptions,
    error::ShotscribeError,
    metadata::SourceMetadata,
    pace::PaceSummary,
    probe::collect_videos,
    progress::{OperationType, ProgressTracker},
    shot::ShotList,
    source::VideoSource,
    still::{ShotStill, StillOptions, pick_stills},
};

/// A fully processed video: metadata, annotated shots, and pace statistics.
#[derive(Debug)]
pub struct AnnotatedVideo {
    /// Source metadata captured at ingest time.
    pub metadata: SourceMetadata,
    /// The shot list with representative frames and annotations filled in.
    pub shots: ShotList,
    /// Pace statistics, when the video had a usable duration.
    pub pace: Option<PaceSummary>,
}

/// The result of one pipeline run.
///
/// Carries the decoded stills alongside the annotated video so callers can
/// write a thumbnail bundle without decoding anything twice.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The annotated video document.
    pub video: AnnotatedVideo,
    /// The representative stills, one per shot, in shot order.
    pub stills: Vec<ShotStill>,
}

/// End-to-end shot annotation pipeline.
///
/// Configure with builder methods, then call [`run`](AnnotationPipeline::run)
/// per video or [`run_collection`](AnnotationPipeline::run_collection) for a
/// directory of videos.
pub struct AnnotationPipeline {
    segmentation: SegmentationOptions,
    stills: StillOptions,
    options: PipelineOptions,
    annotators: Vec<Box<dyn Annotator>>,
}

impl Default for AnnotationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationPipeline {
    /// Create a pipeline with default settings and no detectors.
    pub fn new() -> Self {
        Self {
            segmentation: SegmentationOptions::default(),
            stills: StillOptions::default(),
            options: PipelineOptions::default(),
            annotators: Vec::new(),
        }
    }

    /// Set the segmentation options.
    #[must_use]
    pub fn with_segmentation(mut self, segmentation: SegmentationOptions) -> Self {
        self.segmentation = segmentation;
        self
    }

    /// Set the still-selection options.
    #[must_use]
    pub fn with_stills(mut self, stills: StillOptions) -> Self {
        self.stills = stills;
        self
    }

    /// Set the run options (progress, cancellation, failure policy).
    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a detector. Detectors run per shot in the order they were added.
    #[must_use]
    pub fn add_annotator(mut self, annotator: Box<dyn Annotator>) -> Self {
        self.annotators.push(annotator);
        self
    }

    /// Number of configured detectors.
    pub fn annotator_count(&self) -> usize {
        self.annotators.len()
    }

    /// Run the full pipeline over one video.
    ///
    /// # Errors
    ///
    /// Propagates ingest, segmentation, and decode errors. Detector errors
    /// propagate unless the run options are lenient, in which case the shot
    /// is left without that detector's annotation and a warning is logged.
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<PipelineOutput, ShotscribeError> {
        let mut source = VideoSource::open(path)?;

        let report = source.inspect();
        for warning in &report.warnings {
            log::warn!("{}: {}", source.metadata().id, warning);
        }
        if !report.is_usable() {
            return Err(ShotscribeError::FileOpen {
                path: source.path().to_path_buf(),
                reason: report.errors.join("; "),
            });
        }

        let metadata = source.metadata().clone();
        let video_info = metadata
            .video
            .as_ref()
            .ok_or(ShotscribeError::NoVideoStream)?;

        let boundaries = source.detect_boundaries_with(&self.segmentation, &self.options)?;
        let mut shots = ShotList::from_boundaries(
            &metadata.id,
            video_info,
            metadata.duration,
            &boundaries,
        );

        log::info!(
            "Segmented '{}' into {} shot(s) ({} cut(s) kept)",
            metadata.id,
            shots.len(),
            boundaries.len(),
        );

        let stills = pick_stills(&mut source, &mut shots, &self.stills, &self.options)?;

        self.annotate_stills(&mut shots, &stills)?;

        let pace = PaceSummary::from_shots(&shots, metadata.duration);

        Ok(PipelineOutput {
            video: AnnotatedVideo {
                metadata,
                shots,
                pace,
            },
            stills,
        })
    }

    /// Run the pipeline over every video in a collection directory.
    ///
    /// In lenient mode a video that fails is logged and skipped; otherwise
    /// the first failure aborts the batch.
    pub fn run_collection<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Result<Vec<PipelineOutput>, ShotscribeError> {
        let paths = collect_videos(dir)?;
        let mut outputs = Vec::with_capacity(paths.len());

        for path in paths {
            if self.options.is_cancelled() {
                return Err(ShotscribeError::Cancelled);
            }

            match self.run(&path) {
                Ok(output) => outputs.push(output),
                Err(error) if self.options.is_lenient() => {
                    log::warn!("Skipping {}: {error}", path.display());
                }
                Err(error) => return Err(error),
            }
        }

        Ok(outputs)
    }

    /// Run every detector over every still, attaching results to the shots.
    fn annotate_stills(
        &self,
        shots: &mut ShotList,
        stills: &[ShotStill],
    ) -> Result<(), ShotscribeError> {
        if self.annotators.is_empty() {
            return Ok(());
        }

        let mut tracker = ProgressTracker::new(
            self.options.progress_callback(),
            OperationType::Annotation,
            Some((stills.len() * self.annotators.len()) as u64),
            self.options.batch_size(),
        );

        for still in stills {
            if self.options.is_cancelled() {
                return Err(ShotscribeError::Cancelled);
            }

            let shot_count = shots.len();
            let Some(shot) = shots.get(still.shot_index).cloned() else {
                return Err(ShotscribeError::UnknownShot {
                    video_id: shots.video_id().to_string(),
                    shot_index: still.shot_index,
                    shot_count,
                });
            };

            for annotator in &self.annotators {
                match annotator.annotate(&shot, &still.image) {
                    Ok(annotations) => {
                        for annotation in annotations {
                            shots.annotate(still.shot_index, annotation)?;
                        }
                    }
                    Err(error) if self.options.is_lenient() => {
                        log::warn!(
                            "Detector '{}' failed on {}: {error}",
                            annotator.id(),
                            shot.id(),
                        );
                    }
                    Err(error) => return Err(error),
                }
                tracker.advance(Some(still.frame_number), Some(shot.start_time));
            }
        }

        tracker.finish();
        Ok(())
    }

    /// Run the full pipeline with still decoding and annotation fanned out
    /// across rayon worker threads.
    ///
    /// Each decode worker opens its own demuxer, so the parallel path never
    /// shares an FFmpeg context between threads. Output order matches
    /// [`run`](AnnotationPipeline::run).
    #[cfg(feature = "rayon")]
    pub fn run_parallel<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<PipelineOutput, ShotscribeError> {
        let mut source = VideoSource::open(path)?;

        let report = source.inspect();
        for warning in &report.warnings {
            log::warn!("{}: {}", source.metadata().id, warning);
        }
        if !report.is_usable() {
            return Err(ShotscribeError::FileOpen {
                path: source.path().to_path_buf(),
                reason: report.errors.join("; "),
            });
        }

        let metadata = source.metadata().clone();
        let video_info = metadata
            .video
            .as_ref()
            .ok_or(ShotscribeError::NoVideoStream)?;

        let boundaries = source.detect_boundaries_with(&self.segmentation, &self.options)?;
        let mut shots = ShotList::from_boundaries(
            &metadata.id,
            video_info,
            metadata.duration,
            &boundaries,
        );

        let stills = crate::parallel::pick_stills_parallel(
            source.path(),
            &mut shots,
            &self.stills,
            &self.options,
        )?;

        crate::parallel::annotate_stills_parallel(
            &mut shots,
            &stills,
            &self.annotators,
            &self.options,
        )?;

        let pace = PaceSummary::from_shots(&shots, metadata.duration);

        Ok(PipelineOutput {
            video: AnnotatedVideo {
                metadata,
                shots,
                pace,
            },
            stills,
        })
    }
}
