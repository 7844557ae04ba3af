use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use shotscribe::{
    AnnotationPipeline, Annotator, BoundaryDetectionMode, DetailAnnotator, LibavLogLevel,
    LuminanceAnnotator, PaceSummary, PipelineOptions, PipelineOutput, ProgressCallback,
    ProgressInfo, SegmentationOptions, ShotList, SourceProbe, StillOptions, StillStrategy,
    VideoSource, VlmAnnotator, VlmOptions, collect_videos,
};

const CLI_AFTER_HELP: &str = "Examples:\n  shotscribe metadata input.mp4 --json\n  shotscribe segment input.mp4 --threshold 12 --json\n  shotscribe annotate input.mp4 --detector luminance --detector detail --out-csv shots.csv\n  shotscribe annotate videos/ --detector vlm --vlm-model qwen2-vl-7b-instruct --thumbs bundle\n  shotscribe pace input.mp4 --csv pace.csv\n  shotscribe completions zsh > _shotscribe";

#[derive(Debug, Parser)]
#[command(
    name = "shotscribe",
    version,
    about = "Segment videos into shots, annotate them, and export research interchange data",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Parser, Clone)]
struct SegmentationArgs {
    /// Minimum boundary score (0-100) for a cut to be kept.
    #[arg(long, default_value_t = 10.0)]
    threshold: f64,

    /// Detection strategy (auto, full, keyframes).
    #[arg(long, default_value = "auto")]
    mode: String,

    /// Merge cuts producing shots shorter than this many seconds.
    #[arg(long)]
    min_shot: Option<f64>,

    /// Stop after this many cuts.
    #[arg(long)]
    max_boundaries: Option<usize>,

    /// Only analyse the first part of the video (seconds or HH:MM:SS).
    #[arg(long)]
    max_duration: Option<String>,
}

#[derive(Debug, Parser, Clone)]
struct StillArgs {
    /// Representative frame strategy (middle, sharpest).
    #[arg(long, default_value = "middle")]
    strategy: String,

    /// Frames sampled per shot in sharpest mode.
    #[arg(long, default_value_t = 5)]
    samples: u32,

    /// Maximum still dimension in pixels (longest edge).
    #[arg(long, default_value_t = 640)]
    max_dimension: u32,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print metadata for a video (alias: probe).
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        visible_alias = "info",
        after_help = "Examples:\n  shotscribe metadata input.mp4\n  shotscribe metadata input.mp4 --json"
    )]
    Metadata {
        /// Input video path or URL.
        input: String,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run pre-flight checks and print a report.
    #[command(about = "Inspect a video before processing")]
    Inspect {
        /// Input video path or URL.
        input: String,
    },

    /// Detect shot boundaries and print the shot table.
    #[command(
        about = "Segment a video into shots",
        after_help = "Examples:\n  shotscribe segment input.mp4\n  shotscribe segment input.mp4 --threshold 15 --mode full --json"
    )]
    Segment {
        /// Input video path or URL.
        input: String,

        #[command(flatten)]
        segmentation: SegmentationArgs,

        /// Output shots as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a thumbnail bundle of representative stills.
    #[command(
        about = "Extract one still per shot",
        after_help = "Examples:\n  shotscribe stills input.mp4 --out thumbs\n  shotscribe stills input.mp4 --out thumbs --strategy sharpest --samples 9"
    )]
    Stills {
        /// Input video path or URL.
        input: String,

        /// Output directory for the thumbnail bundle.
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        segmentation: SegmentationArgs,

        #[command(flatten)]
        stills: StillArgs,
    },

    /// Run the full pipeline and export interchange data.
    #[command(
        about = "Segment, annotate, and export",
        after_help = "Examples:\n  shotscribe annotate input.mp4 --out-csv shots.csv --out-json shots.json\n  shotscribe annotate videos/ --detector vlm --vlm-model qwen2-vl-7b-instruct \\\n      --vlm-prompt \"Classify the framing: close-up, medium, or wide.\" --thumbs bundle --lenient"
    )]
    Annotate {
        /// Input video path, URL, or collection directory.
        input: String,

        /// Write per-shot CSV rows to this file.
        #[arg(long)]
        out_csv: Option<PathBuf>,

        /// Write the JSON document to this file.
        #[arg(long)]
        out_json: Option<PathBuf>,

        /// Write per-video thumbnail bundles under this directory.
        #[arg(long)]
        thumbs: Option<PathBuf>,

        /// Detector to run (luminance, detail, vlm). Repeatable.
        #[arg(long = "detector", default_values = ["luminance", "detail"])]
        detectors: Vec<String>,

        /// Base URL of the OpenAI-compatible VLM server.
        #[arg(long, default_value = "http://127.0.0.1:1234")]
        vlm_url: String,

        /// VLM model name.
        #[arg(long)]
        vlm_model: Option<String>,

        /// Prompt sent to the VLM with each still.
        #[arg(long)]
        vlm_prompt: Option<String>,

        /// Detector id for the VLM column (defaults to vlm:{model}).
        #[arg(long)]
        vlm_detector_id: Option<String>,

        /// Log detector failures and continue instead of aborting.
        #[arg(long)]
        lenient: bool,

        /// Decode stills and run detectors on rayon worker threads.
        #[cfg(feature = "rayon")]
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        segmentation: SegmentationArgs,

        #[command(flatten)]
        stills: StillArgs,
    },

    /// Compute per-video pace statistics.
    #[command(
        about = "Compute shot pace statistics",
        after_help = "Examples:\n  shotscribe pace input.mp4\n  shotscribe pace videos/ --csv pace.csv"
    )]
    Pace {
        /// Input video path, URL, or collection directory.
        input: String,

        #[command(flatten)]
        segmentation: SegmentationArgs,

        /// Write pace rows as CSV to this file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output pace statistics as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return Ok(Duration::from_secs_f64(seconds.max(0.0)));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid time format: {trimmed}").into());
    }

    let (hours, minutes, seconds_str) = if parts.len() == 3 {
        (parts[0].parse::<u64>()?, parts[1].parse::<u64>()?, parts[2])
    } else {
        (0_u64, parts[0].parse::<u64>()?, parts[1])
    };

    let seconds = seconds_str.parse::<f64>()?;
    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    Ok(Duration::from_secs_f64(total_seconds.max(0.0)))
}

fn parse_mode(value: &str) -> Option<BoundaryDetectionMode> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Some(BoundaryDetectionMode::Auto),
        "full" | "scdet" => Some(BoundaryDetectionMode::Full),
        "keyframes" | "keyframe" | "fast" => Some(BoundaryDetectionMode::Keyframes),
        _ => None,
    }
}

fn parse_strategy(value: &str, samples: u32) -> Option<StillStrategy> {
    match value.to_ascii_lowercase().as_str() {
        "middle" | "mid" => Some(StillStrategy::Middle),
        "sharpest" | "smart" => Some(StillStrategy::Sharpest { samples }),
        _ => None,
    }
}

fn open_input(input: &str) -> Result<VideoSource, Box<dyn std::error::Error>> {
    if input.contains("://") {
        Ok(VideoSource::open_url(input)?)
    } else {
        Ok(VideoSource::open(input)?)
    }
}

fn segmentation_options(
    args: &SegmentationArgs,
) -> Result<SegmentationOptions, Box<dyn std::error::Error>> {
    let mode = parse_mode(&args.mode).ok_or(format!("unsupported --mode: {}", args.mode))?;

    let mut options = SegmentationOptions::new()
        .threshold(args.threshold)
        .mode(mode);

    if let Some(min_shot) = args.min_shot {
        options = options.min_shot_duration(Duration::from_secs_f64(min_shot.max(0.0)));
    }
    if let Some(max_boundaries) = args.max_boundaries {
        options = options.max_boundaries(max_boundaries);
    }
    if let Some(max_duration) = &args.max_duration {
        options = options.max_duration(parse_timecode(max_duration)?);
    }

    Ok(options)
}

fn still_options(args: &StillArgs) -> Result<StillOptions, Box<dyn std::error::Error>> {
    let strategy = parse_strategy(&args.strategy, args.samples)
        .ok_or(format!("unsupported --strategy: {}", args.strategy))?;
    Ok(StillOptions::new()
        .strategy(strategy)
        .max_dimension(args.max_dimension))
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed: LibavLogLevel = level.parse()?;
        shotscribe::set_libav_log_level(parsed);
    }
    Ok(())
}

/// Drives an indicatif bar from pipeline progress callbacks.
struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        let bar = slot.get_or_insert_with(|| {
            let bar = match info.total {
                Some(total) => ProgressBar::new(total),
                None => ProgressBar::new_spinner(),
            };
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
            ) {
                bar.set_style(style.progress_chars("##-"));
            }
            bar
        });

        bar.set_position(info.current);
        bar.set_message(format!("{:?}", info.operation));

        if info.total.is_some_and(|total| info.current >= total) {
            bar.finish_and_clear();
            *slot = None;
        }
    }
}

fn pipeline_options(global: &GlobalOptions, lenient: bool) -> PipelineOptions {
    let mut options = PipelineOptions::new().lenient(lenient);
    if global.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()));
    }
    options
}

fn build_detectors(
    names: &[String],
    vlm_url: &str,
    vlm_model: Option<&str>,
    vlm_prompt: Option<&str>,
    vlm_detector_id: Option<&str>,
) -> Result<Vec<Box<dyn Annotator>>, Box<dyn std::error::Error>> {
    let mut detectors: Vec<Box<dyn Annotator>> = Vec::new();

    for name in names {
        match name.to_ascii_lowercase().as_str() {
            "luminance" => detectors.push(Box::new(LuminanceAnnotator::default())),
            "detail" => detectors.push(Box::new(DetailAnnotator::default())),
            "vlm" => {
                let model = vlm_model
                    .ok_or("--detector vlm requires --vlm-model")?
                    .to_string();
                let mut options = VlmOptions::new(model).base_url(vlm_url);
                if let Some(prompt) = vlm_prompt {
                    options = options.prompt(prompt);
                }
                if let Some(detector_id) = vlm_detector_id {
                    options = options.detector_id(detector_id);
                }
                detectors.push(Box::new(VlmAnnotator::new(options)));
            }
            other => return Err(format!("unsupported --detector: {other}").into()),
        }
    }

    Ok(detectors)
}

/// Resolve an input argument to the videos it names: a collection directory
/// expands to its contents, anything else passes through.
fn resolve_inputs(input: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let path = Path::new(input);
    if path.is_dir() {
        let videos = collect_videos(path)?;
        if videos.is_empty() {
            return Err(format!("no video files found in {input}").into());
        }
        Ok(videos)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn print_shot_table(shots: &ShotList) {
    for shot in shots.iter() {
        println!(
            "{}  frames {:>6}-{:<6}  {:>8.3}s-{:<8.3}s  score {:>6.2}",
            shot.id(),
            shot.start_frame,
            shot.end_frame,
            shot.start_time.as_secs_f64(),
            shot.end_time.as_secs_f64(),
            shot.boundary_score,
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Metadata { input, json } => {
            let metadata = if input.contains("://") {
                open_input(&input)?.metadata().clone()
            } else {
                SourceProbe::probe(&input)?
            };

            if json {
                let payload = json!({
                    "id": metadata.id,
                    "path": metadata.path.display().to_string(),
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "video": metadata.video.as_ref().map(|video| json!({
                        "width": video.width,
                        "height": video.height,
                        "fps": video.frames_per_second,
                        "frame_count": video.frame_count,
                        "codec": video.codec,
                    })),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Id: {}", metadata.id);
                println!("Format: {}", metadata.format);
                println!("Duration: {:?}", metadata.duration);
                if let Some(video) = &metadata.video {
                    println!(
                        "Video: {}x{} @ {:.2} fps [{}], ~{} frames",
                        video.width,
                        video.height,
                        video.frames_per_second,
                        video.codec,
                        video.frame_count,
                    );
                }
            }
        }
        Commands::Inspect { input } => {
            let source = open_input(&input)?;
            let report = source.inspect();
            print!("{report}");
            if !report.is_usable() {
                return Err("source failed inspection".into());
            }
        }
        Commands::Segment {
            input,
            segmentation,
            json,
        } => {
            let options = segmentation_options(&segmentation)?;
            let mut source = open_input(&input)?;
            let boundaries = source.detect_boundaries(&options)?;

            let metadata = source.metadata();
            let video = metadata.video.as_ref().ok_or("No video stream")?;
            let shots =
                ShotList::from_boundaries(&metadata.id, video, metadata.duration, &boundaries);

            if json {
                let payload: Vec<_> = shots
                    .iter()
                    .map(|shot| {
                        json!({
                            "shot": shot.id(),
                            "index": shot.index,
                            "start_frame": shot.start_frame,
                            "end_frame": shot.end_frame,
                            "start_seconds": shot.start_time.as_secs_f64(),
                            "end_seconds": shot.end_time.as_secs_f64(),
                            "boundary_score": shot.boundary_score,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_shot_table(&shots);
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("{} shot(s) from {} cut(s)", shots.len(), boundaries.len()).green()
                );
            }
        }
        Commands::Stills {
            input,
            out,
            segmentation,
            stills,
        } => {
            if out.exists() && !cli.global.overwrite {
                return Err(format!(
                    "output directory already exists: {} (use --overwrite)",
                    out.display()
                )
                .into());
            }

            let pipeline = AnnotationPipeline::new()
                .with_segmentation(segmentation_options(&segmentation)?)
                .with_stills(still_options(&stills)?)
                .with_options(pipeline_options(&cli.global, false));

            let output = pipeline.run(&input)?;
            let manifest =
                shotscribe::export::write_thumbnail_bundle(&out, &output.video, &output.stills)?;

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "{} still(s) written, manifest at {}",
                    output.stills.len(),
                    manifest.display()
                )
                .green()
            );
        }
        Commands::Annotate {
            input,
            out_csv,
            out_json,
            thumbs,
            detectors,
            vlm_url,
            vlm_model,
            vlm_prompt,
            vlm_detector_id,
            lenient,
            #[cfg(feature = "rayon")]
            parallel,
            segmentation,
            stills,
        } => {
            if let Some(path) = &out_csv {
                ensure_writable_path(path, cli.global.overwrite)?;
            }
            if let Some(path) = &out_json {
                ensure_writable_path(path, cli.global.overwrite)?;
            }

            let mut pipeline = AnnotationPipeline::new()
                .with_segmentation(segmentation_options(&segmentation)?)
                .with_stills(still_options(&stills)?)
                .with_options(pipeline_options(&cli.global, lenient));

            for detector in build_detectors(
                &detectors,
                &vlm_url,
                vlm_model.as_deref(),
                vlm_prompt.as_deref(),
                vlm_detector_id.as_deref(),
            )? {
                pipeline = pipeline.add_annotator(detector);
            }

            let inputs = resolve_inputs(&input)?;
            let mut outputs: Vec<PipelineOutput> = Vec::with_capacity(inputs.len());

            for path in &inputs {
                if cli.global.verbose {
                    eprintln!("processing {}", path.display());
                }

                #[cfg(feature = "rayon")]
                let result = if parallel {
                    pipeline.run_parallel(path)
                } else {
                    pipeline.run(path)
                };
                #[cfg(not(feature = "rayon"))]
                let result = pipeline.run(path);

                match result {
                    Ok(output) => outputs.push(output),
                    Err(error) if lenient => {
                        eprintln!(
                            "{} {}",
                            "warning:".yellow().bold(),
                            format!("skipping {}: {error}", path.display()).yellow()
                        );
                    }
                    Err(error) => return Err(error.into()),
                }
            }

            if outputs.is_empty() {
                return Err("no videos were processed successfully".into());
            }

            if let Some(thumbs_dir) = &thumbs {
                for output in &outputs {
                    let bundle_dir = thumbs_dir.join(&output.video.metadata.id);
                    shotscribe::export::write_thumbnail_bundle(
                        &bundle_dir,
                        &output.video,
                        &output.stills,
                    )?;
                }
                println!("{} {}", "saved".green().bold(), thumbs_dir.display());
            }

            let videos: Vec<shotscribe::AnnotatedVideo> =
                outputs.into_iter().map(|output| output.video).collect();

            if let Some(path) = &out_csv {
                let mut file = fs::File::create(path)?;
                shotscribe::export::write_shots_csv(&mut file, &videos)?;
                println!("{} {}", "saved".green().bold(), path.display());
            }

            if let Some(path) = &out_json {
                let mut file = fs::File::create(path)?;
                shotscribe::export::write_json(&mut file, &videos)?;
                println!("{} {}", "saved".green().bold(), path.display());
            }

            if out_csv.is_none() && out_json.is_none() && thumbs.is_none() {
                let mut stdout = std::io::stdout().lock();
                shotscribe::export::write_shots_csv(&mut stdout, &videos)?;
                stdout.flush()?;
            }

            let total_shots: usize = videos.iter().map(|video| video.shots.len()).sum();
            eprintln!(
                "{} {}",
                "success:".green().bold(),
                format!("{} video(s), {} shot(s) annotated", videos.len(), total_shots).green()
            );
        }
        Commands::Pace {
            input,
            segmentation,
            csv,
            json,
        } => {
            let options = segmentation_options(&segmentation)?;
            let inputs = resolve_inputs(&input)?;

            let mut summaries: Vec<(String, Option<PaceSummary>, f64, f64)> = Vec::new();
            for path in &inputs {
                let mut source = VideoSource::open(path)?;
                let boundaries = source.detect_boundaries(&options)?;
                let metadata = source.metadata();
                let video = metadata.video.as_ref().ok_or("No video stream")?;
                let shots =
                    ShotList::from_boundaries(&metadata.id, video, metadata.duration, &boundaries);
                let pace = PaceSummary::from_shots(&shots, metadata.duration);
                summaries.push((
                    metadata.id.clone(),
                    pace,
                    video.frames_per_second,
                    metadata.duration.as_secs_f64(),
                ));
            }

            if json {
                let payload: Vec<_> = summaries
                    .iter()
                    .map(|(id, pace, frame_rate, duration)| {
                        json!({
                            "id": id,
                            "frame_rate": frame_rate,
                            "total_duration_seconds": duration,
                            "shot_count": pace.as_ref().map(|p| p.shot_count),
                            "asl": pace.as_ref().map(|p| p.average_shot_length),
                            "msl": pace.as_ref().map(|p| p.median_shot_length),
                            "cuts_per_min": pace.as_ref().map(|p| p.cuts_per_minute),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if let Some(path) = csv {
                ensure_writable_path(&path, cli.global.overwrite)?;
                let mut file = fs::File::create(&path)?;
                writeln!(
                    file,
                    "id,frame_rate,shot_count,total_duration_seconds,asl,msl,cuts_per_min"
                )?;
                for (id, pace, frame_rate, duration) in &summaries {
                    match pace {
                        Some(pace) => writeln!(
                            file,
                            "{id},{frame_rate:.3},{},{duration:.3},{:.3},{:.3},{:.3}",
                            pace.shot_count,
                            pace.average_shot_length,
                            pace.median_shot_length,
                            pace.cuts_per_minute,
                        )?,
                        None => writeln!(file, "{id},{frame_rate:.3},,{duration:.3},,,")?,
                    }
                }
                println!("{} {}", "saved".green().bold(), path.display());
            } else {
                for (id, pace, _, _) in &summaries {
                    match pace {
                        Some(pace) => println!(
                            "{id}: {} shot(s), ASL {:.2}s, MSL {:.2}s, {:.2} cuts/min",
                            pace.shot_count,
                            pace.average_shot_length,
                            pace.median_shot_length,
                            pace.cuts_per_minute,
                        ),
                        None => println!("{id}: no pace statistics (zero duration)"),
                    }
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "shotscribe", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_mode, parse_strategy, parse_timecode};
    use shotscribe::{BoundaryDetectionMode, StillStrategy};

    #[test]
    fn parse_mode_aliases() {
        assert_eq!(parse_mode("auto"), Some(BoundaryDetectionMode::Auto));
        assert_eq!(parse_mode("FULL"), Some(BoundaryDetectionMode::Full));
        assert_eq!(parse_mode("fast"), Some(BoundaryDetectionMode::Keyframes));
        assert_eq!(parse_mode("smart"), None);
    }

    #[test]
    fn parse_strategy_aliases() {
        assert_eq!(parse_strategy("middle", 5), Some(StillStrategy::Middle));
        assert_eq!(
            parse_strategy("sharpest", 9),
            Some(StillStrategy::Sharpest { samples: 9 })
        );
        assert_eq!(parse_strategy("random", 5), None);
    }

    #[test]
    fn parse_timecode_formats() {
        let seconds = parse_timecode("75").unwrap();
        assert_eq!(seconds.as_secs(), 75);

        let mm_ss = parse_timecode("01:15").unwrap();
        assert_eq!(mm_ss.as_secs(), 75);

        let hh_mm_ss = parse_timecode("00:01:15.5").unwrap();
        assert_eq!(hh_mm_ss.as_secs(), 75);

        assert!(parse_timecode("").is_err());
        assert!(parse_timecode("1:2:3:4").is_err());
    }
}
