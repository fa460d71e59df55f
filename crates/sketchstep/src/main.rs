//! sketchstep: turn a photograph into a step-by-step drawing guide.
//!
//! Writes one PNG per drawing step into `<out>/<session_id>/`, stores the
//! session record next to them, and prints the record as JSON on stdout.
//! With `--analyze` it instead prints the figure blueprint (landmarks,
//! proportional grid, shading map, wireframe).
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin sketchstep -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use sketchstep_pipeline::preprocess::PreprocessConfig;
use sketchstep_pipeline::{
    Difficulty, FixedLandmarks, Landmark, LandmarkDetector, ProportionalFallback,
};
use sketchstep_render::PaperSize;
use sketchstep_session::{
    FeedbackGenerator, GuideConfig, JsonFileStore, PlaceholderFeedback, RecordStore,
    analyze_drawing, generate_drawing_steps,
};

/// Step-by-step drawing guides from a photograph.
#[derive(Parser)]
#[command(name = "sketchstep", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Directory that receives one sub-directory per session.
    #[arg(long, default_value = "sessions")]
    out: PathBuf,

    /// Paper preset for the step images.
    #[arg(long, value_enum, default_value_t = Paper::A4)]
    paper_size: Paper,

    /// Grid cells per side on the step images (4-20).
    ///
    /// Defaults to the grid size of the chosen difficulty.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(4..=20))]
    grid_divisions: Option<u32>,

    /// Learner level.
    #[arg(long, value_enum, default_value_t = Level::Intermediate)]
    difficulty: Level,

    /// Working resolution (longest side in pixels after resizing).
    #[arg(
        long,
        default_value_t = PreprocessConfig::DEFAULT_WORKING_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..)
    )]
    working_size: u32,

    /// Gaussian blur sigma.
    #[arg(long, default_value_t = PreprocessConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = PreprocessConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PreprocessConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Leave out the final shading step.
    #[arg(long)]
    no_shading: bool,

    /// Print a figure blueprint instead of generating step images.
    #[arg(long)]
    analyze: bool,

    /// Attach instructor feedback to the blueprint (with `--analyze`).
    #[arg(long, requires = "analyze")]
    feedback: bool,

    /// JSON file with detected landmarks (`[{"name", "x", "y"}, ...]`).
    ///
    /// Without it, landmarks are placed by the eight-head proportion model.
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Identity stored with the session record. Defaults to the file name.
    #[arg(long)]
    image_id: Option<String>,

    /// Full guide config as a JSON string.
    ///
    /// When provided, all other tuning flags are ignored. Omitted fields
    /// keep their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Paper preset selection.
#[derive(Clone, Copy, ValueEnum)]
enum Paper {
    /// 1240 x 1754.
    A4,
    /// 1754 x 2480.
    A3,
    /// 1500 x 1500.
    Square,
}

/// Learner level selection.
#[derive(Clone, Copy, ValueEnum)]
enum Level {
    /// 4 x 4 grid.
    Beginner,
    /// 8 x 8 grid.
    Intermediate,
    /// 16 x 16 grid.
    Advanced,
}

/// Build a [`GuideConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual tuning flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<GuideConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let difficulty = match cli.difficulty {
        Level::Beginner => Difficulty::Beginner,
        Level::Intermediate => Difficulty::Intermediate,
        Level::Advanced => Difficulty::Advanced,
    };
    let mut config = GuideConfig {
        difficulty,
        ..GuideConfig::default()
    };
    config.canvas.paper_size = match cli.paper_size {
        Paper::A4 => PaperSize::A4,
        Paper::A3 => PaperSize::A3,
        Paper::Square => PaperSize::Square,
    };
    config.canvas.grid_divisions = cli.grid_divisions.unwrap_or_else(|| difficulty.grid_size());
    config.pipeline.preprocess.working_size = cli.working_size;
    config.pipeline.preprocess.blur_sigma = cli.blur_sigma;
    config.pipeline.preprocess.canny_low = cli.canny_low;
    config.pipeline.preprocess.canny_high = cli.canny_high;
    config.pipeline.planner.include_shading = !cli.no_shading;
    Ok(config)
}

fn load_landmarks(path: &Path) -> Result<Vec<Landmark>, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn image_id(cli: &Cli) -> String {
    cli.image_id.clone().unwrap_or_else(|| {
        cli.image_path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned())
    })
}

fn run_guide(cli: &Cli, image_bytes: &[u8], config: &GuideConfig) -> Result<String, String> {
    let record = generate_drawing_steps(image_bytes, config, &cli.out)
        .map_err(|e| format!("Guide generation failed: {e}"))?;

    let store = JsonFileStore::new(&cli.out);
    store
        .save(&image_id(cli), &record)
        .map_err(|e| format!("Error saving session record: {e}"))?;
    eprintln!(
        "{} steps written to {}",
        record.total_steps,
        cli.out.join(&record.session_id).display(),
    );

    serde_json::to_string_pretty(&record).map_err(|e| format!("Error serializing record: {e}"))
}

fn run_analysis(cli: &Cli, image_bytes: &[u8], config: &GuideConfig) -> Result<String, String> {
    let detector: Box<dyn LandmarkDetector> = match cli.landmarks {
        Some(ref path) => Box::new(FixedLandmarks(load_landmarks(path)?)),
        None => Box::new(ProportionalFallback),
    };
    let feedback = cli
        .feedback
        .then_some(&PlaceholderFeedback as &dyn FeedbackGenerator);

    let report = analyze_drawing(image_bytes, config, detector.as_ref(), feedback)
        .map_err(|e| format!("Analysis failed: {e}"))?;

    serde_json::to_string_pretty(&report).map_err(|e| format!("Error serializing blueprint: {e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(
        path = %cli.image_path.display(),
        bytes = image_bytes.len(),
        "read input image"
    );

    let result = if cli.analyze {
        run_analysis(&cli, &image_bytes, &config)
    } else {
        run_guide(&cli, &image_bytes, &config)
    };

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
