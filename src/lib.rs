//! # shotscribe
//!
//! Shot-based video content annotation — segment videos into shots,
//! annotate representative frames, and export interchange data for a
//! social-media research toolkit.
//!
//! `shotscribe` turns a video file (or a directory of them) into
//! structured shot-level records: where each shot starts and ends, what a
//! representative frame of it looks like, what content detectors say about
//! it, and how fast the video is cut. Decoding is powered by FFmpeg via
//! the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Segment a Video into Shots
//!
//! ```no_run
//! use shotscribe::{SegmentationOptions, ShotList, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4").unwrap();
//! let boundaries = source
//!     .detect_boundaries(&SegmentationOptions::default())
//!     .unwrap();
//! let metadata = source.metadata();
//! let shots = ShotList::from_boundaries(
//!     &metadata.id,
//!     metadata.video.as_ref().unwrap(),
//!     metadata.duration,
//!     &boundaries,
//! );
//! println!("{} shots", shots.len());
//! ```
//!
//! ### Run the Full Pipeline
//!
//! ```no_run
//! use shotscribe::{AnnotationPipeline, LuminanceAnnotator};
//!
//! let pipeline =
//!     AnnotationPipeline::new().add_annotator(Box::new(LuminanceAnnotator::default()));
//! let output = pipeline.run("input.mp4").unwrap();
//!
//! let mut csv = Vec::new();
//! shotscribe::export::write_shots_csv(&mut csv, std::slice::from_ref(&output.video)).unwrap();
//! ```
//!
//! ### Annotate with a Visual-Language Model
//!
//! ```no_run
//! use shotscribe::{AnnotationPipeline, VlmAnnotator, VlmOptions};
//!
//! let detector = VlmAnnotator::new(
//!     VlmOptions::new("qwen2-vl-7b-instruct")
//!         .prompt("Classify the framing of this shot: close-up, medium, or wide. \
//!                  Only return the classification."),
//! );
//! let pipeline = AnnotationPipeline::new().add_annotator(Box::new(detector));
//! ```
//!
//! ## Features
//!
//! - **Ingestion** — open files or URLs, cached stream metadata, pre-flight
//!   inspection, collection directory scanning
//! - **Shot segmentation** — FFmpeg `scdet` boundary detection with a fast
//!   keyframe fallback and minimum-shot-length merging
//! - **Representative stills** — middle-frame or highest-detail selection,
//!   scaled with aspect ratio preserved
//! - **Annotation** — pluggable [`Annotator`] detectors: built-in image
//!   heuristics plus an OpenAI-compatible visual-language-model client
//! - **Pace statistics** — Average Shot Length, Median Shot Length, and
//!   cuts per minute per video
//! - **Interchange export** — per-shot CSV, per-video pace CSV, JSON
//!   document, and a thumbnail bundle with a `.metadata.json` manifest
//! - **Progress & cancellation** — cooperative callbacks and
//!   `CancellationToken` for long-running runs
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `AnnotationPipeline::run_parallel` distributes still decoding and annotation across rayon threads |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod annotate;
pub mod boundary;
pub mod configuration;
mod conversion;
pub mod error;
pub mod export;
pub mod frames;
pub mod inspect;
pub mod libav;
pub mod metadata;
pub mod pace;
#[cfg(feature = "rayon")]
mod parallel;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod shot;
pub mod source;
pub mod still;
pub mod vlm;

pub use annotate::{Annotation, Annotator, DetailAnnotator, LuminanceAnnotator};
pub use boundary::{BoundaryDetectionMode, SegmentationOptions, ShotBoundary};
pub use configuration::PipelineOptions;
pub use error::ShotscribeError;
pub use export::BUNDLE_MANIFEST_NAME;
pub use frames::FrameGrabber;
pub use inspect::InspectionReport;
pub use libav::{LibavLogLevel, set_libav_log_level};
pub use metadata::{SourceMetadata, VideoStreamInfo};
pub use pace::PaceSummary;
pub use pipeline::{AnnotatedVideo, AnnotationPipeline, PipelineOutput};
pub use probe::{SourceProbe, collect_videos};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use shot::{Shot, ShotList};
pub use source::VideoSource;
pub use still::{ShotStill, StillOptions, StillStrategy};
pub use vlm::{VlmAnnotator, VlmOptions};
