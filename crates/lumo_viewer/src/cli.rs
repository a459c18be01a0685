use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumo_renderer::TracerKind;
use serde::{Deserialize, Serialize};

use crate::fly::FlyInput;

/// Log levels selectable from the command line or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments. Anything given here overrides the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "lumo_viewer", version, about = "Headless ray casting viewer")]
pub struct Args {
    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render target width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Render target height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Tracer variant
    #[arg(short, long, value_enum)]
    pub tracer: Option<TracerKind>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<usize>,

    /// Seed for the sample pattern
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tile edge in pixels (multi-hardware tracer)
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Number of execution contexts (multi-hardware tracer)
    #[arg(long)]
    pub contexts: Option<usize>,

    /// Threads per execution context, 0 for automatic
    #[arg(long)]
    pub threads: Option<usize>,

    /// Number of frames to render
    #[arg(short, long)]
    pub frames: Option<u32>,

    /// Output PNG path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keys held during each frame, e.g. `up`, `left+up` or `none`. Repeat per frame.
    #[arg(long = "input")]
    pub input: Vec<FlyInput>,

    /// Logging level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}
