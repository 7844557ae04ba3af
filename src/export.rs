//! Interchange export.
//!
//! Serializes annotated videos into the formats the external research
//! toolkit consumes: per-shot CSV rows, per-video pace CSV rows, a JSON
//! document, and a thumbnail bundle whose file names are shot identifiers
//! (`{video_id}_shot_{index}.jpeg`) plus a `.metadata.json` manifest. The
//! toolkit joins dataset rows to thumbnails on those names, so the naming
//! scheme is part of the contract.
//!
//! CSV is written by hand with a small quoting helper; the column set for
//! annotations is dynamic (one label + confidence column pair per detector
//! seen anywhere in the batch).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    error::ShotscribeError,
    pipeline::AnnotatedVideo,
    shot::Shot,
    still::ShotStill,
};

/// File name of the thumbnail bundle manifest.
pub const BUNDLE_MANIFEST_NAME: &str = ".metadata.json";

/// Fixed per-shot CSV columns, before the dynamic per-detector columns.
const SHOT_COLUMNS: &[&str] = &[
    "video",
    "shot",
    "shot_index",
    "start_frame",
    "end_frame",
    "start_seconds",
    "end_seconds",
    "duration_seconds",
    "boundary_score",
    "representative_frame",
];

/// Write one CSV row per shot for every video in the batch.
///
/// Columns: the fixed shot columns, then `{detector}` and
/// `{detector}_confidence` for every detector that produced at least one
/// annotation anywhere in the batch (sorted by detector id). Shots a
/// detector skipped get empty cells. A detector that produced several
/// labels for one shot gets them joined with `"; "` and the highest
/// confidence.
pub fn write_shots_csv<W: Write>(
    writer: &mut W,
    videos: &[AnnotatedVideo],
) -> Result<(), ShotscribeError> {
    let detectors = collect_detectors(videos);

    let mut header: Vec<String> = SHOT_COLUMNS.iter().map(|c| c.to_string()).collect();
    for detector in &detectors {
        header.push(detector.clone());
        header.push(format!("{detector}_confidence"));
    }
    write_csv_row(writer, &header)?;

    for video in videos {
        for shot in video.shots.iter() {
            let mut row: Vec<String> = vec![
                shot.video_id.clone(),
                shot.id(),
                shot.index.to_string(),
                shot.start_frame.to_string(),
                shot.end_frame.to_string(),
                format!("{:.3}", shot.start_time.as_secs_f64()),
                format!("{:.3}", shot.end_time.as_secs_f64()),
                format!("{:.3}", shot.duration().as_secs_f64()),
                format!("{:.2}", shot.boundary_score),
                shot.representative_frame
                    .map(|frame| frame.to_string())
                    .unwrap_or_default(),
            ];

            for detector in &detectors {
                match joined_annotation(shot, detector) {
                    Some((label, confidence)) => {
                        row.push(label);
                        row.push(format!("{confidence:.3}"));
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }

            write_csv_row(writer, &row)?;
        }
    }

    Ok(())
}

/// Write one CSV row per video with its pace statistics.
///
/// Column names `asl`, `msl`, and `cuts_per_min` are kept verbatim from the
/// research toolkit's existing datasets so merged tables line up.
pub fn write_pace_csv<W: Write>(
    writer: &mut W,
    videos: &[AnnotatedVideo],
) -> Result<(), ShotscribeError> {
    write_csv_row(
        writer,
        &[
            "id",
            "frame_rate",
            "shot_count",
            "total_duration_seconds",
            "asl",
            "msl",
            "cuts_per_min",
        ],
    )?;

    for video in videos {
        let frame_rate = video
            .metadata
            .video
            .as_ref()
            .map(|info| format!("{:.3}", info.frames_per_second))
            .unwrap_or_default();

        let (shot_count, asl, msl, cuts_per_min) = match &video.pace {
            Some(pace) => (
                pace.shot_count.to_string(),
                format!("{:.3}", pace.average_shot_length),
                format!("{:.3}", pace.median_shot_length),
                format!("{:.3}", pace.cuts_per_minute),
            ),
            None => (
                video.shots.len().to_string(),
                String::new(),
                String::new(),
                String::new(),
            ),
        };

        write_csv_row(
            writer,
            &[
                video.metadata.id.clone(),
                frame_rate,
                shot_count,
                format!("{:.3}", video.metadata.duration.as_secs_f64()),
                asl,
                msl,
                cuts_per_min,
            ],
        )?;
    }

    Ok(())
}

/// The JSON document written by [`write_json`].
#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    generator: &'static str,
    version: &'static str,
    videos: Vec<VideoExport<'a>>,
}

#[derive(Debug, Serialize)]
struct VideoExport<'a> {
    id: &'a str,
    path: String,
    format: &'a str,
    duration_seconds: f64,
    frame_rate: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
    codec: Option<&'a str>,
    pace: Option<PaceExport>,
    shots: Vec<ShotExport<'a>>,
}

#[derive(Debug, Serialize)]
struct PaceExport {
    shot_count: usize,
    asl: f64,
    msl: f64,
    cuts_per_min: f64,
}

#[derive(Debug, Serialize)]
struct ShotExport<'a> {
    id: String,
    index: usize,
    start_frame: u64,
    end_frame: u64,
    start_seconds: f64,
    end_seconds: f64,
    boundary_score: f64,
    representative_frame: Option<u64>,
    annotations: &'a [crate::Annotation],
}

/// Write the whole batch as a single pretty-printed JSON document.
pub fn write_json<W: Write>(
    writer: &mut W,
    videos: &[AnnotatedVideo],
) -> Result<(), ShotscribeError> {
    let document = ExportDocument {
        generator: "shotscribe",
        version: env!("CARGO_PKG_VERSION"),
        videos: videos
            .iter()
            .map(|video| {
                let info = video.metadata.video.as_ref();
                VideoExport {
                    id: &video.metadata.id,
                    path: video.metadata.path.display().to_string(),
                    format: &video.metadata.format,
                    duration_seconds: video.metadata.duration.as_secs_f64(),
                    frame_rate: info.map(|i| i.frames_per_second),
                    width: info.map(|i| i.width),
                    height: info.map(|i| i.height),
                    codec: info.map(|i| i.codec.as_str()),
                    pace: video.pace.as_ref().map(|pace| PaceExport {
                        shot_count: pace.shot_count,
                        asl: pace.average_shot_length,
                        msl: pace.median_shot_length,
                        cuts_per_min: pace.cuts_per_minute,
                    }),
                    shots: video
                        .shots
                        .iter()
                        .map(|shot| ShotExport {
                            id: shot.id(),
                            index: shot.index,
                            start_frame: shot.start_frame,
                            end_frame: shot.end_frame,
                            start_seconds: shot.start_time.as_secs_f64(),
                            end_seconds: shot.end_time.as_secs_f64(),
                            boundary_score: shot.boundary_score,
                            representative_frame: shot.representative_frame,
                            annotations: &shot.annotations,
                        })
                        .collect(),
                }
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// One entry in the thumbnail bundle manifest.
#[derive(Debug, Serialize)]
struct ManifestEntry {
    shot: String,
    video: String,
    frame: u64,
    start_seconds: f64,
    end_seconds: f64,
}

/// Write a video's stills into `dir` as `{shot_id}.jpeg` files plus a
/// `.metadata.json` manifest, and return the manifest path.
///
/// The directory is created if missing. Existing files with the same names
/// are overwritten — shot ids are stable, so a re-run refreshes the bundle
/// in place.
pub fn write_thumbnail_bundle(
    dir: &Path,
    video: &AnnotatedVideo,
    stills: &[ShotStill],
) -> Result<PathBuf, ShotscribeError> {
    std::fs::create_dir_all(dir)?;

    let mut manifest: BTreeMap<String, ManifestEntry> = BTreeMap::new();

    for still in stills {
        let Some(shot) = video.shots.get(still.shot_index) else {
            return Err(ShotscribeError::UnknownShot {
                video_id: video.metadata.id.clone(),
                shot_index: still.shot_index,
                shot_count: video.shots.len(),
            });
        };

        let file_name = format!("{}.jpeg", shot.id());
        still.image.save(dir.join(&file_name))?;

        manifest.insert(
            file_name,
            ManifestEntry {
                shot: shot.id(),
                video: shot.video_id.clone(),
                frame: still.frame_number,
                start_seconds: shot.start_time.as_secs_f64(),
                end_seconds: shot.end_time.as_secs_f64(),
            },
        );
    }

    let manifest_path = dir.join(BUNDLE_MANIFEST_NAME);
    let file = std::fs::File::create(&manifest_path)?;
    serde_json::to_writer_pretty(file, &manifest)?;

    log::info!(
        "Wrote thumbnail bundle for '{}' ({} still(s)) to {}",
        video.metadata.id,
        stills.len(),
        dir.display(),
    );

    Ok(manifest_path)
}

/// All detector ids that appear anywhere in the batch, sorted.
fn collect_detectors(videos: &[AnnotatedVideo]) -> Vec<String> {
    let mut detectors: Vec<String> = videos
        .iter()
        .flat_map(|video| video.shots.iter())
        .flat_map(|shot| shot.annotations.iter())
        .map(|annotation| annotation.detector.clone())
        .collect();
    detectors.sort();
    detectors.dedup();
    detectors
}

/// Join a detector's annotations on one shot into a single cell pair.
fn joined_annotation(shot: &Shot, detector: &str) -> Option<(String, f64)> {
    let matching: Vec<&crate::Annotation> = shot
        .annotations
        .iter()
        .filter(|annotation| annotation.detector == detector)
        .collect();

    if matching.is_empty() {
        return None;
    }

    let label = matching
        .iter()
        .map(|annotation| annotation.label.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let confidence = matching
        .iter()
        .map(|annotation| annotation.confidence)
        .fold(f64::MIN, f64::max);

    Some((label, confidence))
}

/// Write one CSV row, quoting fields as needed.
fn write_csv_row<W: Write, S: AsRef<str>>(
    writer: &mut W,
    fields: &[S],
) -> Result<(), ShotscribeError> {
    let line = fields
        .iter()
        .map(|field| csv_escape(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")?;
    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
///
/// Embedded quotes are doubled per RFC 4180.
pub(crate) fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escape_passthrough() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("12.5"), "12.5");
    }

    #[test]
    fn csv_escape_quotes_delimiters() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_escape_keeps_unicode() {
        assert_eq!(csv_escape("café"), "café");
    }

    #[test]
    fn csv_row_joins_fields() {
        let mut buffer = Vec::new();
        write_csv_row(&mut buffer, &["a", "b,c", "d"]).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "a,\"b,c\",d\n");
    }
}
