//! Offline render jobs.
//!
//! A job names an input asset, an output directory and the wiggle settings.
//! After a render, `metadata.json` records the seed and clamped parameters so
//! the same frames can be produced again.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::params::WiggleParams;
use crate::svg::SvgStyle;

#[cfg(not(target_arch = "wasm32"))]
use chrono::{DateTime, Utc};

#[cfg(not(target_arch = "wasm32"))]
use sha2::{Digest, Sha256};

/// Two seconds at the default rate.
fn default_frames() -> usize {
    120
}

/// Frames are written as files, so this only reaches the metadata.
fn default_fps() -> f32 {
    60.0
}

/// One path, one output directory, one set of wiggle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJobSpec {
    /// SVG asset or raw path data file.
    pub input_path: PathBuf,

    /// Output directory for frames.
    pub output_dir: PathBuf,

    /// Number of frames to render.
    #[serde(default = "default_frames")]
    pub frames: usize,

    /// Playback rate for the rendered sequence.
    #[serde(default = "default_fps")]
    pub fps: f32,

    /// Fixed seed. None draws a random one.
    #[serde(default)]
    pub seed: Option<f64>,

    /// Wiggle parameters.
    #[serde(default)]
    pub params: WiggleParams,

    /// Frame presentation.
    #[serde(default)]
    pub style: SvgStyle,
}

impl RenderJobSpec {
    /// Job with default frame count, parameters and style.
    pub fn new(input_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_path,
            output_dir,
            frames: default_frames(),
            fps: default_fps(),
            seed: None,
            params: WiggleParams::default(),
            style: SvgStyle::default(),
        }
    }

    /// Read a camelCase JSON job. Missing fields take their defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot open wiggle job {:?}: {}", path, e))?;
        serde_json::from_str(&json).map_err(|e| format!("Invalid wiggle job {:?}: {}", path, e))
    }

    /// Check that the job can run.
    ///
    /// Wiggle parameters are never rejected here: the driver clamps them the
    /// same way it does for interactive use, so this only warns about what
    /// will change. `effective_params` gives the clamped values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.input_path.exists() {
            return Err(format!("No path asset at {:?}", self.input_path));
        }
        if self.frames == 0 {
            return Err("Frame count must be positive".to_string());
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err("FPS must be a positive number".to_string());
        }
        let effective = self.effective_params();
        if effective != self.params {
            log::warn!("Job params {:?} will run as {:?}", self.params, effective);
        }
        if !effective.is_within_recommended() {
            log::warn!("Parameters {:?} are outside the recommended ranges", effective);
        }
        Ok(())
    }

    /// The parameters the driver will actually animate with.
    pub fn effective_params(&self) -> WiggleParams {
        self.params.sanitized()
    }

    /// File name of frame `index` inside the output directory.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("frame_{:05}.svg", index))
    }
}

/// File written next to the frames of a finished render.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// What a finished render used: enough to reproduce the exact frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg(not(target_arch = "wasm32"))]
pub struct RenderMetadata {
    /// The job as requested, before clamping.
    pub job: RenderJobSpec,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    /// Frames written to the output directory.
    pub frame_count: usize,

    /// Seed the sample offsets came from. Passing it back as the job's
    /// `seed` reproduces the render.
    pub seed: f64,

    /// Parameters after clamping.
    pub effective_params: WiggleParams,

    /// Hex SHA-256 of the input file contents.
    pub input_hash: String,

    pub wiggle_version: String,

    /// Clamped parameters, empty curves and similar non-fatal findings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl RenderMetadata {
    /// Hex SHA-256 of the input the path data was read from.
    pub fn input_digest(contents: &[u8]) -> String {
        format!("{:x}", Sha256::digest(contents))
    }

    /// Write `metadata.json` into `dir` and return its path.
    pub fn write_to_dir(&self, dir: &std::path::Path) -> Result<PathBuf, String> {
        let path = dir.join(METADATA_FILE_NAME);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Cannot encode render metadata: {}", e))?;
        std::fs::write(&path, json).map_err(|e| format!("Cannot write {:?}: {}", path, e))?;
        Ok(path)
    }
}

/// Step of an offline render that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    ReadInput,
    ParsePath,
    DriveFrame,
    WriteFrame,
    WriteMetadata,
}

impl RenderPhase {
    fn describe(self) -> &'static str {
        match self {
            RenderPhase::ReadInput => "reading input",
            RenderPhase::ParsePath => "parsing path data",
            RenderPhase::DriveFrame => "advancing animation",
            RenderPhase::WriteFrame => "writing frame",
            RenderPhase::WriteMetadata => "writing metadata",
        }
    }
}

impl std::fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Why an offline render stopped, and at which frame if it got that far.
#[derive(Debug)]
pub struct RenderError {
    pub phase: RenderPhase,
    pub frame: Option<usize>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed", self.phase)?;
        if let Some(frame) = self.frame {
            write!(f, " at frame {}", frame)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl RenderError {
    pub fn new(phase: RenderPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            frame: None,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error.
    pub fn caused_by(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Record the frame being produced when the error happened.
    pub fn at_frame(mut self, frame: usize) -> Self {
        self.frame = Some(frame);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing_input() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")
    }

    #[test]
    fn test_render_job_spec_validation() {
        let spec = RenderJobSpec::new(
            PathBuf::from("/nonexistent/asset.svg"),
            PathBuf::from("/output"),
        );

        // Should fail because the input does not exist
        assert!(spec.validate().is_err());

        let mut spec = RenderJobSpec::new(existing_input(), PathBuf::from("out"));
        assert!(spec.validate().is_ok());
        spec.frames = 0;
        assert!(spec.validate().is_err());
        spec.frames = 10;
        spec.fps = f32::NAN;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_out_of_range_params_are_clamped_not_rejected() {
        let mut spec = RenderJobSpec::new(existing_input(), PathBuf::from("out"));
        spec.params = WiggleParams::new(-3.0, 0.1, 0);
        assert!(spec.validate().is_ok());

        let effective = spec.effective_params();
        assert_eq!(effective.point_count, 1);
        assert_eq!(effective.amplitude, 0.0);
        // The job itself keeps what was asked for.
        assert_eq!(spec.params.point_count, 0);
    }

    #[test]
    fn test_render_job_spec_defaults() {
        let spec = RenderJobSpec::new(PathBuf::from("asset.svg"), PathBuf::from("output"));

        assert_eq!(spec.frames, 120);
        assert_eq!(spec.fps, 60.0);
        assert_eq!(spec.seed, None);
        assert_eq!(spec.params, WiggleParams::default());
        assert_eq!(spec.style, SvgStyle::default());
    }

    #[test]
    fn test_render_job_spec_from_json() {
        let json = r#"{
            "inputPath": "asset.svg",
            "outputDir": "out",
            "frames": 30,
            "seed": 12.5,
            "params": { "amplitude": 4, "pointCount": 20 }
        }"#;
        let spec: RenderJobSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.frames, 30);
        assert_eq!(spec.seed, Some(12.5));
        assert_eq!(spec.params.amplitude, 4.0);
        assert_eq!(spec.params.point_count, 20);
        assert_eq!(spec.params.speed, 0.1);
        assert_eq!(spec.fps, 60.0);
    }

    #[test]
    fn test_frame_path_is_zero_padded() {
        let spec = RenderJobSpec::new(PathBuf::from("a.svg"), PathBuf::from("out"));
        assert_eq!(spec.frame_path(7), PathBuf::from("out").join("frame_00007.svg"));
    }

    #[test]
    fn test_input_digest_is_sha256_hex() {
        assert_eq!(
            RenderMetadata::input_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::new(RenderPhase::ParsePath, "bad path");
        assert_eq!(err.to_string(), "parsing path data failed: bad path");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = RenderError::new(RenderPhase::WriteFrame, "frame_00003.svg")
            .at_frame(3)
            .caused_by(io);
        assert_eq!(
            err.to_string(),
            "writing frame failed at frame 3: frame_00003.svg: gone"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
