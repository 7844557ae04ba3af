//! Shot data model.
//!
//! A [`Shot`] is a contiguous run of frames with stable visual content.
//! [`ShotList`] assembles detected boundaries into the ordered,
//! non-overlapping, gap-free shot sequence the rest of the pipeline works
//! with: the still picker fills in representative frames, annotators attach
//! [`Annotation`]s, and the exporter turns the list into interchange rows.

use std::time::Duration;

use crate::{
    annotate::Annotation,
    boundary::ShotBoundary,
    conversion,
    error::ShotscribeError,
    metadata::VideoStreamInfo,
};

/// A single shot within a video.
///
/// Holds a back-reference to the owning video by identifier only — the shot
/// does not own any decoded data. Frame numbers are 0-indexed and the span
/// is inclusive on both ends.
#[derive(Debug, Clone)]
pub struct Shot {
    /// Identifier of the owning video.
    pub video_id: String,
    /// Zero-based position of this shot within the video.
    pub index: usize,
    /// First frame of the shot (inclusive).
    pub start_frame: u64,
    /// Last frame of the shot (inclusive).
    pub end_frame: u64,
    /// Timestamp of the first frame.
    pub start_time: Duration,
    /// Timestamp just past the last frame (equals the next shot's start).
    pub end_time: Duration,
    /// Confidence score of the cut that opened this shot.
    ///
    /// The opening shot of a video has no preceding cut and reports 0.0.
    pub boundary_score: f64,
    /// Frame chosen to represent this shot, once a still has been picked.
    pub representative_frame: Option<u64>,
    /// Annotations attached to this shot, in the order they were produced.
    pub annotations: Vec<Annotation>,
}

impl Shot {
    /// Stable identifier for this shot: `{video_id}_shot_{index}`.
    ///
    /// External toolkits join thumbnail files and dataset rows on this id,
    /// so its format is part of the interchange contract.
    pub fn id(&self) -> String {
        format!("{}_shot_{}", self.video_id, self.index)
    }

    /// Number of frames in the shot.
    pub fn frame_count(&self) -> u64 {
        self.end_frame - self.start_frame + 1
    }

    /// Wall-clock length of the shot.
    pub fn duration(&self) -> Duration {
        self.end_time.saturating_sub(self.start_time)
    }

    /// The frame in the middle of the shot span.
    pub fn middle_frame(&self) -> u64 {
        self.start_frame + (self.end_frame - self.start_frame) / 2
    }
}

/// The ordered shot sequence of one video.
///
/// Construction from a boundary list enforces the structural invariants the
/// exporter and annotators rely on: shots are ordered by start frame,
/// non-overlapping, contiguous, start at frame 0, and end at the last frame.
/// A video with no detected cuts yields exactly one shot spanning the whole
/// frame range.
///
/// # Example
///
/// ```no_run
/// use shotscribe::{SegmentationOptions, ShotList, VideoSource};
///
/// let mut source = VideoSource::open("input.mp4").unwrap();
/// let boundaries = source
///     .detect_boundaries(&SegmentationOptions::default())
///     .unwrap();
/// let metadata = source.metadata();
/// let shots = ShotList::from_boundaries(
///     &metadata.id,
///     metadata.video.as_ref().unwrap(),
///     metadata.duration,
///     &boundaries,
/// );
/// println!("{} shots", shots.len());
/// ```
#[derive(Debug, Clone)]
pub struct ShotList {
    video_id: String,
    shots: Vec<Shot>,
}

impl ShotList {
    /// Assemble a shot list from detected boundaries.
    ///
    /// Boundary input is sorted and deduplicated by frame number; cuts at
    /// frame 0 or past the end of the video are discarded rather than
    /// producing degenerate shots.
    pub fn from_boundaries(
        video_id: &str,
        video: &VideoStreamInfo,
        duration: Duration,
        boundaries: &[ShotBoundary],
    ) -> Self {
        let frames_per_second = video.frames_per_second;

        // Resolve the total frame count, falling back to duration-based
        // estimation, then to the boundary extent for streams whose header
        // reports neither.
        let mut frame_count = video.frame_count;
        if frame_count == 0 && frames_per_second > 0.0 {
            frame_count = (duration.as_secs_f64() * frames_per_second) as u64;
        }
        if frame_count == 0 {
            frame_count = boundaries
                .iter()
                .map(|boundary| boundary.frame_number + 1)
                .max()
                .unwrap_or(1);
        }

        // Cut frames: sorted, deduplicated, strictly inside (0, frame_count).
        let mut cuts: Vec<(u64, f64)> = boundaries
            .iter()
            .filter(|boundary| {
                boundary.frame_number > 0 && boundary.frame_number < frame_count
            })
            .map(|boundary| (boundary.frame_number, boundary.score))
            .collect();
        cuts.sort_by_key(|(frame, _)| *frame);
        cuts.dedup_by_key(|(frame, _)| *frame);

        let mut shots = Vec::with_capacity(cuts.len() + 1);
        let mut start_frame: u64 = 0;
        let mut opening_score: f64 = 0.0;

        for (cut_frame, score) in &cuts {
            shots.push(Self::build_shot(
                video_id,
                shots.len(),
                start_frame,
                cut_frame - 1,
                opening_score,
                frames_per_second,
                duration,
            ));
            start_frame = *cut_frame;
            opening_score = *score;
        }

        // Final (or only) shot runs to the last frame.
        shots.push(Self::build_shot(
            video_id,
            shots.len(),
            start_frame,
            frame_count - 1,
            opening_score,
            frames_per_second,
            duration,
        ));

        log::debug!(
            "Assembled {} shot(s) for '{}' from {} boundary candidate(s)",
            shots.len(),
            video_id,
            boundaries.len(),
        );

        Self {
            video_id: video_id.to_string(),
            shots,
        }
    }

    fn build_shot(
        video_id: &str,
        index: usize,
        start_frame: u64,
        end_frame: u64,
        boundary_score: f64,
        frames_per_second: f64,
        duration: Duration,
    ) -> Shot {
        let start_time = conversion::frame_number_to_timestamp(start_frame, frames_per_second);
        let mut end_time =
            conversion::frame_number_to_timestamp(end_frame + 1, frames_per_second);
        if duration > Duration::ZERO && end_time > duration {
            end_time = duration;
        }

        Shot {
            video_id: video_id.to_string(),
            index,
            start_frame,
            end_frame,
            start_time,
            end_time,
            boundary_score,
            representative_frame: None,
            annotations: Vec::new(),
        }
    }

    /// Identifier of the video these shots belong to.
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// All shots, in order.
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// Iterate over the shots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Shot> {
        self.shots.iter()
    }

    /// Number of shots.
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    /// Whether the list contains no shots.
    ///
    /// Only possible for a list that was never constructed from boundaries —
    /// [`from_boundaries`](ShotList::from_boundaries) always yields at least
    /// one shot.
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Look up a shot by index.
    pub fn get(&self, index: usize) -> Option<&Shot> {
        self.shots.get(index)
    }

    /// Look up a shot mutably by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Shot> {
        self.shots.get_mut(index)
    }

    /// Attach an annotation to the shot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ShotscribeError::UnknownShot`] if no shot exists at that
    /// index, so an annotation can never reference a shot that is not in
    /// the list.
    pub fn annotate(
        &mut self,
        index: usize,
        annotation: Annotation,
    ) -> Result<(), ShotscribeError> {
        let shot_count = self.shots.len();
        let shot = self
            .shots
            .get_mut(index)
            .ok_or_else(|| ShotscribeError::UnknownShot {
                video_id: self.video_id.clone(),
                shot_index: index,
                shot_count,
            })?;
        shot.annotations.push(annotation);
        Ok(())
    }

    /// Record the representative frame chosen for the shot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ShotscribeError::UnknownShot`] if no shot exists at that
    /// index.
    pub fn set_representative(
        &mut self,
        index: usize,
        frame_number: u64,
    ) -> Result<(), ShotscribeError> {
        let shot_count = self.shots.len();
        let shot = self
            .shots
            .get_mut(index)
            .ok_or_else(|| ShotscribeError::UnknownShot {
                video_id: self.video_id.clone(),
                shot_index: index,
                shot_count,
            })?;
        shot.representative_frame = Some(frame_number);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ShotList {
    type Item = &'a Shot;
    type IntoIter = std::slice::Iter<'a, Shot>;

    fn into_iter(self) -> Self::IntoIter {
        self.shots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_info(frame_count: u64, frames_per_second: f64) -> VideoStreamInfo {
        VideoStreamInfo {
            width: 1280,
            height: 720,
            frames_per_second,
            frame_count,
            codec: "h264".to_string(),
            stream_index: 0,
        }
    }

    fn cut(frame_number: u64, score: f64) -> ShotBoundary {
        ShotBoundary {
            timestamp: Duration::from_secs_f64(frame_number as f64 / 25.0),
            frame_number,
            score,
        }
    }

    #[test]
    fn no_boundaries_yields_single_full_span_shot() {
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(250, 25.0),
            Duration::from_secs(10),
            &[],
        );
        assert_eq!(shots.len(), 1);
        let only = shots.get(0).expect("shot");
        assert_eq!(only.start_frame, 0);
        assert_eq!(only.end_frame, 249);
        assert_eq!(only.boundary_score, 0.0);
        assert_eq!(only.id(), "clip_shot_0");
    }

    #[test]
    fn shots_are_ordered_contiguous_and_cover_the_video() {
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(250, 25.0),
            Duration::from_secs(10),
            &[cut(100, 42.0), cut(50, 33.0), cut(200, 77.0)],
        );

        assert_eq!(shots.len(), 4);
        assert_eq!(shots.get(0).unwrap().start_frame, 0);
        assert_eq!(shots.shots().last().unwrap().end_frame, 249);

        for pair in shots.shots().windows(2) {
            assert_eq!(pair[0].end_frame + 1, pair[1].start_frame);
            assert_eq!(pair[0].end_time, pair[1].start_time);
            assert!(pair[0].start_frame < pair[1].start_frame);
        }

        // The cut that opened a shot carries its score.
        assert_eq!(shots.get(1).unwrap().boundary_score, 33.0);
        assert_eq!(shots.get(2).unwrap().boundary_score, 42.0);
        assert_eq!(shots.get(3).unwrap().boundary_score, 77.0);
    }

    #[test]
    fn duplicate_and_out_of_range_cuts_are_discarded() {
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(100, 25.0),
            Duration::from_secs(4),
            &[cut(0, 99.0), cut(40, 10.0), cut(40, 11.0), cut(500, 90.0)],
        );
        assert_eq!(shots.len(), 2);
        assert_eq!(shots.get(1).unwrap().start_frame, 40);
    }

    #[test]
    fn unknown_frame_count_falls_back_to_duration() {
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(0, 25.0),
            Duration::from_secs(8),
            &[cut(100, 20.0)],
        );
        assert_eq!(shots.len(), 2);
        assert_eq!(shots.shots().last().unwrap().end_frame, 199);
    }

    #[test]
    fn annotate_unknown_shot_is_rejected() {
        let mut shots = ShotList::from_boundaries(
            "clip",
            &stream_info(100, 25.0),
            Duration::from_secs(4),
            &[],
        );
        let annotation = Annotation {
            label: "bright".to_string(),
            confidence: 0.9,
            detector: "luminance".to_string(),
        };
        assert!(shots.annotate(0, annotation.clone()).is_ok());
        assert!(matches!(
            shots.annotate(5, annotation),
            Err(ShotscribeError::UnknownShot { shot_index: 5, .. })
        ));
    }

    #[test]
    fn middle_frame_and_durations() {
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(100, 25.0),
            Duration::from_secs(4),
            &[cut(50, 15.0)],
        );
        let first = shots.get(0).unwrap();
        assert_eq!(first.middle_frame(), 24);
        assert_eq!(first.frame_count(), 50);
        assert_eq!(first.duration(), Duration::from_secs(2));
    }
}
