//! Pre-flight source inspection.
//!
//! Provides [`VideoSource::inspect`](crate::VideoSource::inspect) which
//! checks an ingested video's cached metadata and returns an
//! [`InspectionReport`] describing anything that would make segmentation or
//! annotation unreliable.
//!
//! # Example
//!
//! ```no_run
//! use shotscribe::VideoSource;
//!
//! let source = VideoSource::open("input.mp4")?;
//! let report = source.inspect();
//! if !report.is_usable() {
//!     for error in &report.errors {
//!         eprintln!("Error: {error}");
//!     }
//! }
//! # Ok::<(), shotscribe::ShotscribeError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::metadata::SourceMetadata;

/// Summary of source inspection.
///
/// Produced by [`VideoSource::inspect`](crate::VideoSource::inspect).
/// Contains lists of informational notices, warnings, and errors found
/// during inspection.
#[derive(Debug, Clone, Default)]
pub struct InspectionReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues that may affect segmentation quality.
    pub warnings: Vec<String>,
    /// Fatal issues that will prevent the pipeline from running.
    pub errors: Vec<String>,
}

impl InspectionReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result — only errors make the source
    /// unusable.
    pub fn is_usable(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of findings (info + warnings + errors).
    pub fn finding_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for InspectionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.finding_count() == 0 {
            writeln!(f, "No findings.")?;
        }
        Ok(())
    }
}

/// Run inspection checks on the cached metadata.
///
/// This function is called by [`VideoSource::inspect`](crate::VideoSource::inspect).
pub(crate) fn inspect_metadata(metadata: &SourceMetadata) -> InspectionReport {
    let mut report = InspectionReport::default();

    let Some(video) = &metadata.video else {
        report
            .errors
            .push("File contains no video stream — nothing to segment".to_string());
        return report;
    };

    if metadata.duration == Duration::ZERO {
        report
            .warnings
            .push("Container duration is zero — frame counting will be unreliable".to_string());
    }

    if video.width == 0 || video.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}×{}",
            video.width, video.height,
        ));
    }

    if video.frames_per_second <= 0.0 {
        report.warnings.push(
            "Video frame rate is zero or negative — shot timestamps will be unreliable"
                .to_string(),
        );
    } else if video.frames_per_second > 240.0 {
        report.warnings.push(format!(
            "Unusually high frame rate ({:.1} fps) — boundary detection may be slow",
            video.frames_per_second,
        ));
    }

    if video.frame_count == 0 && metadata.duration > Duration::ZERO {
        report
            .warnings
            .push("Estimated frame count is zero despite non-zero duration".to_string());
    }

    report.info.push(format!(
        "Video: {} {}×{} @ {:.2} fps, ~{} frames",
        video.codec, video.width, video.height, video.frames_per_second, video.frame_count,
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::VideoStreamInfo;
    use std::path::PathBuf;

    fn sample_metadata() -> SourceMetadata {
        SourceMetadata {
            id: "clip".to_string(),
            path: PathBuf::from("clip.mp4"),
            format: "mp4".to_string(),
            duration: Duration::from_secs(10),
            video: Some(VideoStreamInfo {
                width: 1280,
                height: 720,
                frames_per_second: 25.0,
                frame_count: 250,
                codec: "h264".to_string(),
                stream_index: 0,
            }),
            tags: None,
        }
    }

    #[test]
    fn healthy_source_is_usable() {
        let report = inspect_metadata(&sample_metadata());
        assert!(report.is_usable());
        assert!(report.errors.is_empty());
        assert!(report.info.iter().any(|line| line.contains("h264")));
    }

    #[test]
    fn missing_video_stream_is_fatal() {
        let mut metadata = sample_metadata();
        metadata.video = None;
        let report = inspect_metadata(&metadata);
        assert!(!report.is_usable());
    }

    #[test]
    fn zero_dimensions_are_fatal() {
        let mut metadata = sample_metadata();
        if let Some(video) = metadata.video.as_mut() {
            video.width = 0;
        }
        let report = inspect_metadata(&metadata);
        assert!(!report.is_usable());
    }

    #[test]
    fn odd_frame_rates_warn_but_do_not_fail() {
        let mut metadata = sample_metadata();
        if let Some(video) = metadata.video.as_mut() {
            video.frames_per_second = 480.0;
        }
        let report = inspect_metadata(&metadata);
        assert!(report.is_usable());
        assert!(!report.warnings.is_empty());
    }
}
