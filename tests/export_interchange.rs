//! Interchange export integration tests.
//!
//! Builds annotated videos in memory and checks the exact CSV and JSON
//! surface the external research toolkit consumes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use image::{DynamicImage, RgbImage};
use shotscribe::{
    AnnotatedVideo, Annotation, PaceSummary, ShotBoundary, ShotList, ShotStill, SourceMetadata,
    VideoStreamInfo, export,
};

fn stream_info() -> VideoStreamInfo {
    VideoStreamInfo {
        width: 1280,
        height: 720,
        frames_per_second: 25.0,
        frame_count: 250,
        codec: "h264".to_string(),
        stream_index: 0,
    }
}

fn metadata(id: &str) -> SourceMetadata {
    SourceMetadata {
        id: id.to_string(),
        path: PathBuf::from(format!("{id}.mp4")),
        format: "mp4".to_string(),
        duration: Duration::from_secs(10),
        video: Some(stream_info()),
        tags: Some(HashMap::new()),
    }
}

fn cut(frame_number: u64, score: f64) -> ShotBoundary {
    ShotBoundary {
        timestamp: Duration::from_secs_f64(frame_number as f64 / 25.0),
        frame_number,
        score,
    }
}

fn annotated_video(id: &str) -> AnnotatedVideo {
    let info = stream_info();
    let mut shots = ShotList::from_boundaries(
        id,
        &info,
        Duration::from_secs(10),
        &[cut(100, 42.5), cut(175, 61.0)],
    );

    shots.set_representative(0, 50).unwrap();
    shots.set_representative(1, 137).unwrap();
    shots.set_representative(2, 212).unwrap();

    shots
        .annotate(
            0,
            Annotation {
                label: "dark".to_string(),
                confidence: 0.9,
                detector: "luminance".to_string(),
            },
        )
        .unwrap();
    shots
        .annotate(
            1,
            Annotation {
                label: "wide, establishing".to_string(),
                confidence: 1.0,
                detector: "vlm:qwen2-vl-7b-instruct".to_string(),
            },
        )
        .unwrap();

    let pace = PaceSummary::from_shots(&shots, Duration::from_secs(10));
    AnnotatedVideo {
        metadata: metadata(id),
        shots,
        pace,
    }
}

#[test]
fn shots_csv_has_dynamic_detector_columns() {
    let videos = vec![annotated_video("clip_a")];
    let mut buffer = Vec::new();
    export::write_shots_csv(&mut buffer, &videos).unwrap();
    let csv = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "video,shot,shot_index,start_frame,end_frame,start_seconds,end_seconds,\
         duration_seconds,boundary_score,representative_frame,\
         luminance,luminance_confidence,\
         vlm:qwen2-vl-7b-instruct,vlm:qwen2-vl-7b-instruct_confidence"
    );
    // Header + 3 shots.
    assert_eq!(lines.len(), 4);

    // Shot 0 carries the luminance columns, empty VLM columns.
    assert!(lines[1].starts_with("clip_a,clip_a_shot_0,0,0,99,"));
    assert!(lines[1].contains("dark,0.900"));

    // Shot 1: label with an embedded comma must be quoted.
    assert!(lines[2].contains("\"wide, establishing\",1.000"));

    // Shot 2 has no annotations at all: trailing empty cells.
    assert!(lines[3].ends_with(",,,"));
}

#[test]
fn pace_csv_uses_toolkit_column_names() {
    let videos = vec![annotated_video("clip_a"), annotated_video("clip_b")];
    let mut buffer = Vec::new();
    export::write_pace_csv(&mut buffer, &videos).unwrap();
    let csv = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "id,frame_rate,shot_count,total_duration_seconds,asl,msl,cuts_per_min"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("clip_a,25.000,3,10.000,"));
    // 3 shots over 10 seconds: ASL 3.333, 12 cuts/min.
    assert!(lines[1].contains("3.333"));
    assert!(lines[1].ends_with("12.000"));
}

#[test]
fn json_document_shape_is_stable() {
    let videos = vec![annotated_video("clip_a")];
    let mut buffer = Vec::new();
    export::write_json(&mut buffer, &videos).unwrap();
    let document: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(document["generator"], "shotscribe");
    assert_eq!(document["videos"][0]["id"], "clip_a");
    assert_eq!(document["videos"][0]["frame_rate"], 25.0);
    assert_eq!(document["videos"][0]["pace"]["shot_count"], 3);
    let cuts_per_min = document["videos"][0]["pace"]["cuts_per_min"]
        .as_f64()
        .expect("cuts_per_min");
    assert!((cuts_per_min - 12.0).abs() < 1e-9);

    let shots = document["videos"][0]["shots"]
        .as_array()
        .expect("shots array");
    assert_eq!(shots.len(), 3);
    assert_eq!(shots[0]["id"], "clip_a_shot_0");
    assert_eq!(shots[0]["start_frame"], 0);
    assert_eq!(shots[0]["representative_frame"], 50);
    assert_eq!(shots[0]["annotations"][0]["detector"], "luminance");
    assert_eq!(shots[0]["annotations"][0]["label"], "dark");
}

#[test]
fn thumbnail_bundle_names_and_manifest() {
    let video = annotated_video("clip_a");
    let stills: Vec<ShotStill> = [(0usize, 50u64), (1, 137), (2, 212)]
        .iter()
        .map(|&(shot_index, frame_number)| ShotStill {
            shot_index,
            frame_number,
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(
                32,
                18,
                image::Rgb([90, 90, 90]),
            )),
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let manifest_path = export::write_thumbnail_bundle(dir.path(), &video, &stills).unwrap();

    assert!(dir.path().join("clip_a_shot_0.jpeg").exists());
    assert!(dir.path().join("clip_a_shot_1.jpeg").exists());
    assert!(dir.path().join("clip_a_shot_2.jpeg").exists());
    assert_eq!(
        manifest_path.file_name().unwrap().to_string_lossy(),
        export::BUNDLE_MANIFEST_NAME
    );

    let manifest: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["clip_a_shot_1.jpeg"]["shot"], "clip_a_shot_1");
    assert_eq!(manifest["clip_a_shot_1.jpeg"]["video"], "clip_a");
    assert_eq!(manifest["clip_a_shot_1.jpeg"]["frame"], 137);
}

#[test]
fn bundle_rejects_stills_for_unknown_shots() {
    let video = annotated_video("clip_a");
    let stills = vec![ShotStill {
        shot_index: 9,
        frame_number: 1,
        image: DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]))),
    }];

    let dir = tempfile::tempdir().unwrap();
    assert!(export::write_thumbnail_bundle(dir.path(), &video, &stills).is_err());
}
