//! Lightweight probing and collection scanning.
//!
//! [`SourceProbe`] extracts metadata from a video without keeping the demuxer
//! open, which is what the pipeline uses when scanning a collection directory
//! before committing to full segmentation. [`collect_videos`] expands a
//! collection directory into an ordered list of video paths.

use std::path::{Path, PathBuf};

use crate::error::ShotscribeError;
use crate::metadata::SourceMetadata;
use crate::source::VideoSource;

/// File extensions treated as video when scanning a collection directory.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov", "m4v", "mpg", "mpeg", "ts"];

/// Lightweight video probe.
///
/// Opens the file, extracts metadata, and immediately closes the demuxer.
/// The resulting [`SourceMetadata`] is identical to what
/// [`VideoSource::metadata`](crate::VideoSource::metadata) returns, but
/// without keeping the file open.
///
/// # Example
///
/// ```no_run
/// use shotscribe::SourceProbe;
///
/// let metadata = SourceProbe::probe("input.mp4")?;
/// println!("Duration: {:?}, format: {}", metadata.duration, metadata.format);
/// # Ok::<(), shotscribe::ShotscribeError>(())
/// ```
pub struct SourceProbe;

impl SourceProbe {
    /// Probe a video file and return its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ShotscribeError::FileOpen`] if the file cannot be opened or
    /// recognised as a media file.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<SourceMetadata, ShotscribeError> {
        let source = VideoSource::open(path)?;
        Ok(source.metadata.clone())
    }

    /// Probe multiple video files and return their metadata.
    ///
    /// Files that cannot be probed produce an `Err` entry in the result
    /// vector rather than aborting the entire batch.
    pub fn probe_many<P: AsRef<Path>>(
        paths: &[P],
    ) -> Vec<Result<SourceMetadata, ShotscribeError>> {
        paths.iter().map(Self::probe).collect()
    }
}

/// Expand a collection directory into an ordered list of video file paths.
///
/// Matches files by extension (case-insensitive) against a fixed list of
/// common video container extensions, without opening them. Results are
/// sorted by file name so repeated runs over the same collection produce
/// rows in the same order.
///
/// # Errors
///
/// Returns [`ShotscribeError::IoError`] if the directory cannot be read.
///
/// # Example
///
/// ```no_run
/// use shotscribe::collect_videos;
///
/// let videos = collect_videos("dataset/videos")?;
/// println!("{} videos in collection", videos.len());
/// # Ok::<(), shotscribe::ShotscribeError>(())
/// ```
pub fn collect_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, ShotscribeError> {
    let mut videos: Vec<PathBuf> = Vec::new();

    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_video = path
            .extension()
            .map(|extension| {
                let lowered = extension.to_string_lossy().to_ascii_lowercase();
                VIDEO_EXTENSIONS.contains(&lowered.as_str())
            })
            .unwrap_or(false);
        if is_video {
            videos.push(path);
        }
    }

    videos.sort();
    log::debug!(
        "Collected {} video(s) from {}",
        videos.len(),
        dir.as_ref().display()
    );
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_videos_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.mp4", "a.MKV", "notes.txt", "c.webm"] {
            std::fs::write(dir.path().join(name), b"").expect("write");
        }

        let videos = collect_videos(dir.path()).expect("collect");
        let names: Vec<String> = videos
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["a.MKV", "b.mp4", "c.webm"]);
    }

    #[test]
    fn collect_videos_missing_dir_errors() {
        assert!(collect_videos("/definitely/not/here").is_err());
    }
}
