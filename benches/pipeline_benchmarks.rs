//! Benchmarks for the decode-free pipeline stages: shot assembly, pace
//! statistics, and CSV export.

use std::path::PathBuf;
use std::time::Duration;

use criterion::{Criterion, black_box};
use shotscribe::{
    AnnotatedVideo, Annotation, PaceSummary, ShotBoundary, ShotList, SourceMetadata,
    VideoStreamInfo, export,
};

fn stream_info(frame_count: u64) -> VideoStreamInfo {
    VideoStreamInfo {
        width: 1920,
        height: 1080,
        frames_per_second: 25.0,
        frame_count,
        codec: "h264".to_string(),
        stream_index: 0,
    }
}

fn synthetic_boundaries(count: u64, stride: u64) -> Vec<ShotBoundary> {
    (1..=count)
        .map(|index| ShotBoundary {
            timestamp: Duration::from_secs_f64((index * stride) as f64 / 25.0),
            frame_number: index * stride,
            score: 10.0 + (index % 90) as f64,
        })
        .collect()
}

fn synthetic_video(shot_count: u64) -> AnnotatedVideo {
    let frame_count = (shot_count + 1) * 50;
    let duration = Duration::from_secs_f64(frame_count as f64 / 25.0);
    let info = stream_info(frame_count);
    let boundaries = synthetic_boundaries(shot_count, 50);
    let mut shots = ShotList::from_boundaries("bench", &info, duration, &boundaries);

    for index in 0..shots.len() {
        let frame = shots.get(index).map(|shot| shot.middle_frame()).unwrap_or(0);
        shots.set_representative(index, frame).ok();
        shots
            .annotate(
                index,
                Annotation {
                    label: "normal".to_string(),
                    confidence: 0.75,
                    detector: "luminance".to_string(),
                },
            )
            .ok();
    }

    let pace = PaceSummary::from_shots(&shots, duration);
    AnnotatedVideo {
        metadata: SourceMetadata {
            id: "bench".to_string(),
            path: PathBuf::from("bench.mp4"),
            format: "mp4".to_string(),
            duration,
            video: Some(info),
            tags: None,
        },
        shots,
        pace,
    }
}

fn bench_shot_assembly(c: &mut Criterion) {
    let info = stream_info(500_000);
    let boundaries = synthetic_boundaries(10_000, 50);
    let duration = Duration::from_secs(20_000);

    c.bench_function("shot_assembly_10k_cuts", |b| {
        b.iter(|| {
            black_box(ShotList::from_boundaries(
                "bench",
                black_box(&info),
                duration,
                black_box(&boundaries),
            ))
        })
    });
}

fn bench_pace(c: &mut Criterion) {
    let video = synthetic_video(10_000);

    c.bench_function("pace_10k_shots", |b| {
        b.iter(|| {
            black_box(PaceSummary::from_shots(
                black_box(&video.shots),
                video.metadata.duration,
            ))
        })
    });
}

fn bench_csv_export(c: &mut Criterion) {
    let videos = vec![synthetic_video(1_000)];

    c.bench_function("csv_export_1k_shots", |b| {
        b.iter(|| {
            let mut buffer = Vec::with_capacity(256 * 1024);
            export::write_shots_csv(&mut buffer, black_box(&videos)).ok();
            black_box(buffer)
        })
    });
}

criterion::criterion_group!(benches, bench_shot_assembly, bench_pace, bench_csv_export);
criterion::criterion_main!(benches);
