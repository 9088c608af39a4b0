use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::driver::{draw_seed, ManualScheduler, WiggleDriver};
use crate::params::WiggleParams;
use crate::path_geometry::{ArcLengthPath, MeasuredPath};
use crate::render_job::{RenderError, RenderJobSpec, RenderMetadata, RenderPhase};
use crate::sampler::sample;
use crate::svg::{path_data_from_source, render_frame_svg};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render wiggle frames to disk as SVG
    Render {
        /// SVG asset or file containing raw path data
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory for frames
        #[arg(long)]
        out: Option<PathBuf>,

        /// JSON job spec; command line flags override its values
        #[arg(long)]
        job: Option<PathBuf>,

        /// Number of frames
        #[arg(long)]
        frames: Option<usize>,

        /// Offset range in path units
        #[arg(long)]
        amplitude: Option<f64>,

        /// Phase advance per frame
        #[arg(long)]
        speed: Option<f64>,

        /// Number of sampling intervals along the path
        #[arg(long)]
        points: Option<usize>,

        /// Fixed seed (random if omitted)
        #[arg(long)]
        seed: Option<f64>,
    },

    /// Print the sample points of a path as JSON
    Sample {
        /// SVG asset or file containing raw path data
        #[arg(long)]
        input: PathBuf,

        /// Number of sampling intervals along the path
        #[arg(long, default_value_t = 10)]
        points: usize,

        /// Offset range in path units
        #[arg(long, default_value_t = 10.0)]
        amplitude: f64,

        /// Fixed seed (random if omitted)
        #[arg(long)]
        seed: Option<f64>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            out,
            job,
            frames,
            amplitude,
            speed,
            points,
            seed,
        } => {
            let mut spec = match job {
                Some(job_path) => RenderJobSpec::from_file(&job_path).map_err(anyhow::Error::msg)?,
                None => {
                    let input = input.clone().context("--input is required without --job")?;
                    let out = out.clone().context("--out is required without --job")?;
                    RenderJobSpec::new(input, out)
                }
            };
            if let Some(input) = input {
                spec.input_path = input;
            }
            if let Some(out) = out {
                spec.output_dir = out;
            }
            if let Some(frames) = frames {
                spec.frames = frames;
            }
            if let Some(amplitude) = amplitude {
                spec.params.amplitude = amplitude;
            }
            if let Some(speed) = speed {
                spec.params.speed = speed;
            }
            if let Some(points) = points {
                spec.params.point_count = points;
            }
            if seed.is_some() {
                spec.seed = seed;
            }

            spec.validate().map_err(anyhow::Error::msg)?;
            let metadata = render_job(&spec)?;
            println!(
                "Rendered {} frames to {:?} (seed {:.4})",
                metadata.frame_count, spec.output_dir, metadata.seed
            );
        }
        Commands::Sample {
            input,
            points,
            amplitude,
            seed,
        } => {
            let path_data = read_path_data(&input)?;
            let path = MeasuredPath::parse(&path_data)
                .with_context(|| format!("Failed to parse path data in {:?}", input))?;
            let seed = seed.unwrap_or_else(draw_seed);
            let params = WiggleParams::new(amplitude, 0.0, points).sanitized();
            log::info!(
                "Sampling path of length {:.3} with seed {:.4}",
                path.total_length(),
                seed
            );
            let samples = sample(&path, params.point_count, seed, params.amplitude);
            println!("{}", serde_json::to_string_pretty(&samples)?);
        }
    }
    Ok(())
}

fn read_path_data(input: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {:?}", input))?;
    path_data_from_source(&contents).map_err(anyhow::Error::msg)
}

/// Render every frame of `spec` to disk and write `metadata.json`.
///
/// Frames are driven through a [`ManualScheduler`]: each pending frame is
/// fired immediately after the previous one has been written.
pub fn render_job(spec: &RenderJobSpec) -> Result<RenderMetadata, RenderError> {
    let started_at = Utc::now();

    let bytes = std::fs::read(&spec.input_path).map_err(|e| {
        RenderError::new(RenderPhase::ReadInput, format!("{:?}", spec.input_path)).caused_by(e)
    })?;
    let input_hash = RenderMetadata::input_digest(&bytes);
    let contents = String::from_utf8(bytes).map_err(|e| {
        RenderError::new(RenderPhase::ReadInput, format!("{:?} is not UTF-8", spec.input_path))
            .caused_by(e)
    })?;
    let path_data = path_data_from_source(&contents)
        .map_err(|e| RenderError::new(RenderPhase::ReadInput, e))?;

    let mut warnings = Vec::new();
    let effective_params = spec.effective_params();
    if effective_params != spec.params {
        warnings.push(format!(
            "Parameters {:?} clamped to {:?}",
            spec.params, effective_params
        ));
    }

    let mut driver = WiggleDriver::new(ManualScheduler::new());
    if let Some(seed) = spec.seed {
        driver = driver.with_fixed_seed(seed);
    }
    driver.start(&path_data, effective_params).map_err(|e| {
        RenderError::new(RenderPhase::ParsePath, format!("{:?}", spec.input_path)).caused_by(e)
    })?;

    if driver.curve().is_empty() {
        warnings.push("Path produced an empty curve".to_string());
    }

    std::fs::create_dir_all(&spec.output_dir).map_err(|e| {
        RenderError::new(RenderPhase::WriteFrame, format!("cannot create {:?}", spec.output_dir))
            .caused_by(e)
    })?;

    log::info!(
        "Rendering {} frames to {:?} (seed {:.4})",
        spec.frames,
        spec.output_dir,
        driver.seed()
    );

    for i in 0..spec.frames {
        if i > 0 {
            let handle = driver.scheduler_mut().take_pending().ok_or_else(|| {
                RenderError::new(RenderPhase::DriveFrame, "no frame was scheduled").at_frame(i)
            })?;
            if driver.on_frame(handle).is_none() {
                return Err(
                    RenderError::new(RenderPhase::DriveFrame, "scheduled frame did not publish")
                        .at_frame(i),
                );
            }
        }

        let frame_path = spec.frame_path(i);
        let document = render_frame_svg(driver.curve(), &spec.style);
        std::fs::write(&frame_path, document).map_err(|e| {
            RenderError::new(RenderPhase::WriteFrame, format!("{:?}", frame_path))
                .at_frame(i)
                .caused_by(e)
        })?;

        if i % 60 == 0 {
            log::debug!("frame {} written", i);
        }
    }

    let seed = driver.seed();
    driver.stop();

    let metadata = RenderMetadata {
        job: spec.clone(),
        started_at,
        completed_at: Utc::now(),
        frame_count: spec.frames,
        seed,
        effective_params: driver.params(),
        input_hash,
        wiggle_version: env!("CARGO_PKG_VERSION").to_string(),
        warnings,
    };
    let written = metadata
        .write_to_dir(&spec.output_dir)
        .map_err(|e| RenderError::new(RenderPhase::WriteMetadata, e))?;
    log::debug!("metadata written to {:?}", written);

    Ok(metadata)
}
