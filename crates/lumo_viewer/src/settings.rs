//! Viewer settings: defaults, then an optional JSON file, then CLI overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lumo_math::{Vec3, Vec4};
use lumo_renderer::{Projection, TilingConfig, TracerKind, DEFAULT_SAMPLE_COUNT};
use serde::{Deserialize, Serialize};

use crate::cli::{Args, LogLevel};
use crate::fly::FlyInput;

/// Initial camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -75.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::perspective(150.0),
        }
    }
}

/// Everything the viewer needs to set up and run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub tracer: TracerKind,
    pub samples: usize,
    pub seed: u64,
    pub tiling: TilingConfig,
    /// Threads per execution context, 0 lets the pool decide
    pub threads_per_context: usize,
    pub frames: u32,
    /// Simulated seconds per frame for camera motion; measured time when unset
    pub frame_seconds: Option<f64>,
    pub output: PathBuf,
    pub camera: CameraSettings,
    pub background: Vec4,
    /// Color the target is cleared to before each frame
    pub clear_color: Vec4,
    /// Held keys per frame, repeated cyclically
    pub input: Vec<FlyInput>,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            tracer: TracerKind::Software,
            samples: DEFAULT_SAMPLE_COUNT,
            seed: 0,
            tiling: TilingConfig::default(),
            threads_per_context: 0,
            frames: 1,
            frame_seconds: None,
            output: PathBuf::from("lumo.png"),
            camera: CameraSettings::default(),
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            clear_color: Vec4::new(0.2, 0.2, 0.8, 1.0),
            input: Vec::new(),
            log_level: LogLevel::Info,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve the final settings for `args`: defaults, config file, flags.
    pub fn load(args: &Args) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_args(args);
        settings.validate()?;
        Ok(settings)
    }

    /// Override fields with whatever was given on the command line.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(tracer) = args.tracer {
            self.tracer = tracer;
        }
        if let Some(samples) = args.samples {
            self.samples = samples;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(tile_size) = args.tile_size {
            self.tiling.tile_size = tile_size;
        }
        if let Some(contexts) = args.contexts {
            self.tiling.contexts = contexts;
        }
        if let Some(threads) = args.threads {
            self.threads_per_context = threads;
        }
        if let Some(frames) = args.frames {
            self.frames = frames;
        }
        if let Some(output) = &args.output {
            self.output = output.clone();
        }
        if !args.input.is_empty() {
            self.input = args.input.clone();
        }
        if let Some(level) = args.log_level {
            self.log_level = level;
        }
    }

    /// Reject values that cannot produce a frame.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("Image size must be positive, got {}x{}", self.width, self.height);
        }
        if self.samples == 0 {
            bail!("At least one sample per pixel is required");
        }
        if self.frames == 0 {
            bail!("At least one frame must be rendered");
        }
        if self.tracer == TracerKind::MultiHardware {
            self.tiling.validate().context("Invalid tiling")?;
        }
        if let Some(seconds) = self.frame_seconds {
            if !(seconds >= 0.0 && seconds.is_finite()) {
                bail!("Frame time must be a finite, non-negative number of seconds");
            }
        }
        if (self.camera.look_at - self.camera.position).length_squared() == 0.0 {
            bail!("Camera position and look-at target must differ");
        }
        Ok(())
    }

    /// Scripted input for frame `index`.
    pub fn input_for_frame(&self, index: u32) -> FlyInput {
        if self.input.is_empty() {
            FlyInput::default()
        } else {
            self.input[index as usize % self.input.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.samples, 25);
        assert_eq!(settings.camera.position, Vec3::new(0.0, 0.0, -75.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(
            r#"{
                "width": 64,
                "tracer": "multi-hardware",
                "tiling": { "tile_size": 16 },
                "camera": { "projection": { "type": "orthographic", "pixel_size": 0.5 } },
                "input": [{ "forward": true }, {}]
            }"#,
        )
        .unwrap();

        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 200);
        assert_eq!(settings.tracer, TracerKind::MultiHardware);
        assert_eq!(settings.tiling.tile_size, 16);
        assert_eq!(settings.tiling.contexts, TilingConfig::default().contexts);
        assert_eq!(settings.camera.projection, Projection::orthographic(0.5));
        assert_eq!(settings.camera.look_at, Vec3::ZERO);
        assert!(settings.input_for_frame(0).forward);
        assert!(settings.input_for_frame(1).is_idle());
        assert!(settings.input_for_frame(2).forward);
    }

    #[test]
    fn test_unknown_tracer_rejected() {
        assert!(Settings::from_json(r#"{ "tracer": "quantum" }"#).is_err());
    }

    #[test]
    fn test_args_override_file_values() {
        let mut settings = Settings::from_json(r#"{ "samples": 4, "frames": 3 }"#).unwrap();
        let args = Args {
            samples: Some(9),
            tracer: Some(TracerKind::Hardware),
            ..Default::default()
        };
        settings.apply_args(&args);

        assert_eq!(settings.samples, 9);
        assert_eq!(settings.frames, 3);
        assert_eq!(settings.tracer, TracerKind::Hardware);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut settings = Settings {
            width: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        settings.width = 10;
        settings.samples = 0;
        assert!(settings.validate().is_err());

        settings.samples = 1;
        settings.tracer = TracerKind::MultiHardware;
        settings.tiling.contexts = 0;
        assert!(settings.validate().is_err());

        settings.tiling.contexts = 2;
        settings.camera.look_at = settings.camera.position;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Settings::from_file(Path::new("/nonexistent/lumo.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lumo.json"));
    }
}
