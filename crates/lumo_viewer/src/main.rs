mod app;
mod cli;
mod fly;
mod fps;
mod settings;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use crate::app::Viewer;
use crate::cli::Args;
use crate::settings::Settings;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let settings = Settings::load(&args)?;

    env_logger::Builder::from_default_env()
        .filter_level(settings.log_level.into())
        .init();

    info!("Starting Lumo Viewer");
    info!(
        "{}x{} with {} tracer, {} samples, {} frames",
        settings.width, settings.height, settings.tracer, settings.samples, settings.frames
    );

    let output = settings.output.clone();
    let mut viewer = Viewer::new(settings)?;
    let summary = viewer.run()?;
    viewer.save(&output)?;
    info!("Final camera position {}", viewer.camera().position());

    if summary.incomplete_frames > 0 {
        warn!(
            "{} of {} frames were incomplete",
            summary.incomplete_frames, summary.frames
        );
        return Ok(ExitCode::from(2));
    }

    info!("Done");
    Ok(ExitCode::SUCCESS)
}
