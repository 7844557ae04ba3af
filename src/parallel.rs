//! Parallel still decoding and annotation.
//!
//! This module distributes per-shot work across threads using [`rayon`].
//! Each decode worker opens its own demuxer and decoder so there is no
//! shared mutable FFmpeg state. The public API is exposed through
//! [`AnnotationPipeline::run_parallel`](crate::AnnotationPipeline) — this
//! module contains only the internal implementation.

use std::path::Path;

use ::rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    annotate::{Annotation, Annotator},
    configuration::PipelineOptions,
    error::ShotscribeError,
    shot::{Shot, ShotList},
    source::VideoSource,
    still::{ShotStill, StillOptions, pick_still},
};

/// How many shots each decode worker handles per opened demuxer.
///
/// Opening a demuxer context per shot would dominate runtime on videos with
/// many short shots; chunking amortizes the open across neighbouring shots,
/// which also keeps each worker's seeks roughly sequential.
const SHOTS_PER_WORKER: usize = 8;

/// Decode representative stills for all shots across rayon workers.
///
/// Records each chosen frame on the corresponding [`Shot`] and returns the
/// stills in shot order.
pub(crate) fn pick_stills_parallel(
    file_path: &Path,
    shots: &mut ShotList,
    options: &StillOptions,
    pipeline: &PipelineOptions,
) -> Result<Vec<ShotStill>, ShotscribeError> {
    let snapshots: Vec<Shot> = shots.iter().cloned().collect();
    if snapshots.is_empty() {
        return Ok(Vec::new());
    }

    let chunks: Vec<Vec<Shot>> = snapshots
        .chunks(SHOTS_PER_WORKER)
        .map(|chunk| chunk.to_vec())
        .collect();

    log::debug!(
        "Decoding {} still(s) across {} worker chunk(s)",
        snapshots.len(),
        chunks.len(),
    );

    let results: Result<Vec<Vec<ShotStill>>, ShotscribeError> = chunks
        .into_par_iter()
        .map(|chunk| {
            if pipeline.is_cancelled() {
                return Err(ShotscribeError::Cancelled);
            }

            let mut source = VideoSource::open(file_path)?;
            let mut stills = Vec::with_capacity(chunk.len());
            for shot in &chunk {
                let (frame_number, image) = pick_still(&mut source, shot, options)?;
                stills.push(ShotStill {
                    shot_index: shot.index,
                    frame_number,
                    image,
                });
            }
            Ok(stills)
        })
        .collect();

    let mut stills: Vec<ShotStill> = results?.into_iter().flatten().collect();
    stills.sort_by_key(|still| still.shot_index);

    for still in &stills {
        shots.set_representative(still.shot_index, still.frame_number)?;
    }

    Ok(stills)
}

/// Run every detector over every still across rayon workers.
///
/// Detector results are attached to the shots afterwards, on the calling
/// thread, so the shot list itself is never shared mutably.
pub(crate) fn annotate_stills_parallel(
    shots: &mut ShotList,
    stills: &[ShotStill],
    annotators: &[Box<dyn Annotator>],
    pipeline: &PipelineOptions,
) -> Result<(), ShotscribeError> {
    if annotators.is_empty() || stills.is_empty() {
        return Ok(());
    }

    let snapshots: Vec<Shot> = shots.iter().cloned().collect();

    let results: Result<Vec<(usize, Vec<Annotation>)>, ShotscribeError> = stills
        .into_par_iter()
        .map(|still| {
            if pipeline.is_cancelled() {
                return Err(ShotscribeError::Cancelled);
            }

            let shot = snapshots.get(still.shot_index).ok_or_else(|| {
                ShotscribeError::UnknownShot {
                    video_id: snapshots
                        .first()
                        .map(|s| s.video_id.clone())
                        .unwrap_or_default(),
                    shot_index: still.shot_index,
                    shot_count: snapshots.len(),
                }
            })?;

            let mut annotations = Vec::new();
            for annotator in annotators {
                match annotator.annotate(shot, &still.image) {
                    Ok(mut produced) => annotations.append(&mut produced),
                    Err(error) if pipeline.is_lenient() => {
                        log::warn!(
                            "Detector '{}' failed on {}: {error}",
                            annotator.id(),
                            shot.id(),
                        );
                    }
                    Err(error) => return Err(error),
                }
            }

            Ok((still.shot_index, annotations))
        })
        .collect();

    for (shot_index, annotations) in results? {
        for annotation in annotations {
            shots.annotate(shot_index, annotation)?;
        }
    }

    Ok(())
}
