//! Film-pace statistics.
//!
//! Translates a video's shot list into the pace metrics used in film-style
//! research: Average Shot Length (ASL), Median Shot Length (MSL), and cuts
//! per minute. These attach to the exported video record so downstream
//! analysis can compare editing pace across a collection.

use std::time::Duration;

use crate::shot::ShotList;

/// Per-video pace statistics.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use shotscribe::PaceSummary;
/// # use shotscribe::{ShotList, VideoStreamInfo};
/// # let info = VideoStreamInfo {
/// #     width: 1, height: 1, frames_per_second: 25.0, frame_count: 250,
/// #     codec: "h264".into(), stream_index: 0,
/// # };
/// # let shots = ShotList::from_boundaries("clip", &info, Duration::from_secs(10), &[]);
/// let pace = PaceSummary::from_shots(&shots, Duration::from_secs(10)).unwrap();
/// assert_eq!(pace.shot_count, 1);
/// assert_eq!(pace.average_shot_length, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PaceSummary {
    /// Number of shots in the video.
    pub shot_count: usize,
    /// Average Shot Length in seconds: total duration divided by shot count.
    pub average_shot_length: f64,
    /// Median Shot Length in seconds.
    pub median_shot_length: f64,
    /// Cuts per minute: (shot count − 1) divided by the duration in minutes.
    pub cuts_per_minute: f64,
    /// Total duration the metrics were computed over.
    pub total_duration: Duration,
}

impl PaceSummary {
    /// Compute pace statistics for a shot list.
    ///
    /// Returns `None` when the list is empty or the duration is zero, since
    /// every metric would otherwise divide by zero.
    pub fn from_shots(shots: &ShotList, total_duration: Duration) -> Option<Self> {
        if shots.is_empty() || total_duration == Duration::ZERO {
            return None;
        }

        let shot_count = shots.len();
        let total_seconds = total_duration.as_secs_f64();

        let average_shot_length = total_seconds / shot_count as f64;

        let mut shot_lengths: Vec<f64> = shots
            .iter()
            .map(|shot| shot.duration().as_secs_f64())
            .collect();
        let median_shot_length = median(&mut shot_lengths);

        let cuts_per_minute = (shot_count as f64 - 1.0) / (total_seconds / 60.0);

        Some(Self {
            shot_count,
            average_shot_length,
            median_shot_length,
            cuts_per_minute,
            total_duration,
        })
    }
}

/// Median of a slice of durations in seconds.
///
/// Even-length input averages the two middle values.
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::ShotBoundary;
    use crate::metadata::VideoStreamInfo;

    fn stream_info(frame_count: u64) -> VideoStreamInfo {
        VideoStreamInfo {
            width: 1280,
            height: 720,
            frames_per_second: 25.0,
            frame_count,
            codec: "h264".to_string(),
            stream_index: 0,
        }
    }

    fn cut(frame_number: u64) -> ShotBoundary {
        ShotBoundary {
            timestamp: Duration::from_secs_f64(frame_number as f64 / 25.0),
            frame_number,
            score: 50.0,
        }
    }

    #[test]
    fn four_even_shots_over_a_minute() {
        // 60s at 25fps = 1500 frames, cut every 375 frames.
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(1500),
            Duration::from_secs(60),
            &[cut(375), cut(750), cut(1125)],
        );
        let pace = PaceSummary::from_shots(&shots, Duration::from_secs(60)).expect("pace");

        assert_eq!(pace.shot_count, 4);
        assert_eq!(pace.average_shot_length, 15.0);
        assert_eq!(pace.median_shot_length, 15.0);
        assert_eq!(pace.cuts_per_minute, 3.0);
    }

    #[test]
    fn median_of_uneven_shots() {
        // 10s, cuts at 1s and 3s: shot lengths 1, 2, 7.
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(250),
            Duration::from_secs(10),
            &[cut(25), cut(75)],
        );
        let pace = PaceSummary::from_shots(&shots, Duration::from_secs(10)).expect("pace");

        assert_eq!(pace.shot_count, 3);
        assert!((pace.median_shot_length - 2.0).abs() < 1e-9);
        assert!((pace.average_shot_length - 10.0 / 3.0).abs() < 1e-9);
        assert!((pace.cuts_per_minute - 12.0).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_yields_none() {
        let shots = ShotList::from_boundaries(
            "clip",
            &stream_info(250),
            Duration::from_secs(10),
            &[],
        );
        assert!(PaceSummary::from_shots(&shots, Duration::ZERO).is_none());
    }

    #[test]
    fn median_averages_even_counts() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut values), 2.5);
        let mut odd = vec![9.0, 1.0, 5.0];
        assert_eq!(median(&mut odd), 5.0);
    }
}
