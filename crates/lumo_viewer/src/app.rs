//! Headless viewer application: scene, camera, tracer and frame loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use lumo_core::reference_scene;
use lumo_math::Rect;
use lumo_renderer::{
    Camera, ColorFormat, Extent, FrameReport, HostDriver, Rgba8, Sampler, SharedTexture,
    TextureFactory, TextureType, Tracer, TracerBuilder,
};

use crate::fly::FlyCamera;
use crate::fps::FpsCounter;
use crate::settings::Settings;

/// Outcome of a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u32,
    pub incomplete_frames: u32,
}

/// Application state
pub struct Viewer {
    settings: Settings,
    camera: Camera,
    fly: FlyCamera,
    tracer: Box<dyn Tracer>,
    target: SharedTexture,
    fps: FpsCounter,
    clear_color: Rgba8,
    last_frame_seconds: f64,
}

impl Viewer {
    /// Build the scene, camera, render target and tracer from `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let mut scene = reference_scene();
        scene.set_background(settings.background);
        let bounds = scene.world_bounds();
        info!(
            "Loaded scene '{}': {} nodes, bounds {} .. {}",
            scene.name,
            scene.node_count(),
            bounds.min(),
            bounds.max()
        );
        let scene = scene.into_shared();

        let mut camera = Camera::new();
        camera
            .set_orientation(settings.camera.position, settings.camera.look_at)
            .context("Invalid camera orientation")?;
        camera
            .set_up(settings.camera.up)
            .context("Invalid camera up vector")?;
        camera
            .set_viewport(Rect::from_size(settings.width, settings.height))
            .context("Invalid viewport")?;
        camera.set_projection(settings.camera.projection);

        let driver = Arc::new(HostDriver::new(settings.threads_per_context));
        let texture = driver
            .create_texture(
                TextureType::Tex2D,
                Extent::new(settings.width, settings.height),
                ColorFormat::R8G8B8A8,
            )
            .context("Failed to create render target")?;
        let clear_color = Rgba8::from_color(settings.clear_color);
        let target = texture.into_shared();
        target.lock().fill(clear_color);

        let sampler = Sampler::jittered(settings.samples, settings.seed)
            .context("Failed to create sampler")?;

        let tracer = TracerBuilder::new(settings.tracer)
            .with_scene(scene)
            .with_sampler(Arc::new(sampler))
            .with_driver(driver)
            .with_tiling(settings.tiling)
            .with_target(target.clone())
            .build()
            .with_context(|| format!("Failed to create {} tracer", settings.tracer))?;

        Ok(Self {
            settings,
            camera,
            fly: FlyCamera::default(),
            tracer,
            target,
            fps: FpsCounter::new(),
            clear_color,
            last_frame_seconds: 0.0,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Apply this frame's input, clear the target and render.
    pub fn frame(&mut self, index: u32) -> Result<FrameReport> {
        let seconds = self
            .settings
            .frame_seconds
            .unwrap_or(self.last_frame_seconds);

        let input = self.settings.input_for_frame(index);
        self.fly
            .update(&mut self.camera, input, seconds as f32)
            .with_context(|| format!("Camera update failed on frame {}", index))?;
        if !input.is_idle() {
            debug!(
                "Frame {}: input {}, camera at {} looking {}",
                index,
                input,
                self.camera.position(),
                self.camera.forward()
            );
        }

        let start = Instant::now();
        self.target.lock().fill(self.clear_color);
        let report = self
            .tracer
            .render(&self.camera)
            .with_context(|| format!("Frame {} failed", index))?;

        self.last_frame_seconds = start.elapsed().as_secs_f64();
        self.fps.update(self.last_frame_seconds);
        if self.fps.overflow() {
            info!(
                "FPS: {:.1} (average {:.1})",
                self.fps.current_fps(),
                self.fps.average_fps()
            );
        }

        Ok(report)
    }

    /// Render every configured frame.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for index in 0..self.settings.frames {
            let report = self.frame(index)?;
            summary.frames += 1;

            if report.is_complete() {
                info!(
                    "Frame {}: {} tiles in {:.2?}",
                    index,
                    report.tiles.len(),
                    report.elapsed
                );
            } else {
                summary.incomplete_frames += 1;
                for tile in report.failed_tiles() {
                    warn!(
                        "Frame {}: tile {:?} failed: {:?}",
                        index,
                        tile.tile.rect(),
                        tile.outcome
                    );
                }
                warn!(
                    "Frame {} incomplete: {} of {} tiles rendered",
                    index,
                    report.completed_count(),
                    report.tiles.len()
                );
            }
        }

        Ok(summary)
    }

    /// Write the current target contents as PNG.
    pub fn save(&self, path: &Path) -> Result<()> {
        let image = self.target.lock().to_image();
        image
            .save(path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        info!("Saved {}x{} image to {}", image.width(), image.height(), path.display());
        Ok(())
    }
}
