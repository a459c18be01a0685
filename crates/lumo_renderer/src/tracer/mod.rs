//! Tracers: strategies for running the pixel kernel over a frame.
//!
//! Three interchangeable variants share one [`Tracer`] interface and one
//! per-pixel function, so they differ only in how work is scheduled:
//!
//! - [`SoftwareTracer`]: a single sequential pass on the calling thread.
//! - [`HardwareTracer`]: the whole viewport dispatched to one execution context.
//! - [`MultiHardwareTracer`]: disjoint tiles spread over several contexts.
//!
//! The variant is chosen at startup from a [`TracerKind`] via [`TracerBuilder`].

mod hardware;
mod multi_hardware;
mod software;

pub use hardware::HardwareTracer;
pub use multi_hardware::MultiHardwareTracer;
pub use software::SoftwareTracer;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use log::{debug, info};
use lumo_core::SharedScene;
use lumo_math::Rect;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::device::GraphicsDriver;
use crate::error::{RenderError, RenderResult};
use crate::kernel::PixelKernel;
use crate::sampler::Sampler;
use crate::target::{SharedTexture, TextureLock};
use crate::tile::{Tile, DEFAULT_TILE_SIZE};

/// Which tracer variant to run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TracerKind {
    #[default]
    Software,
    Hardware,
    MultiHardware,
}

impl TracerKind {
    pub fn name(self) -> &'static str {
        match self {
            TracerKind::Software => "software",
            TracerKind::Hardware => "hardware",
            TracerKind::MultiHardware => "multi-hardware",
        }
    }

    /// Whether this variant needs a [`GraphicsDriver`].
    pub fn needs_driver(self) -> bool {
        match self {
            TracerKind::Software => false,
            TracerKind::Hardware | TracerKind::MultiHardware => true,
        }
    }
}

impl fmt::Display for TracerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TracerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <TracerKind as ValueEnum>::from_str(s, true)
    }
}

/// Tile layout for [`MultiHardwareTracer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingConfig {
    /// Tile edge in pixels
    pub tile_size: u32,
    /// Number of execution contexts rendering concurrently
    pub contexts: usize,
}

impl TilingConfig {
    pub fn validate(&self) -> RenderResult<()> {
        if self.tile_size == 0 {
            return Err(RenderError::InvalidTiling("tile size must be positive".into()));
        }
        if self.contexts == 0 {
            return Err(RenderError::InvalidTiling(
                "at least one context is required".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        let contexts = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            contexts,
        }
    }
}

/// What happened to one tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileOutcome {
    Completed,
    Failed(RenderError),
}

impl TileOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TileOutcome::Completed)
    }
}

/// Per-tile entry of a [`FrameReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileReport {
    pub tile: Tile,
    /// Index of the context that ran the tile
    pub context: usize,
    pub outcome: TileOutcome,
    pub elapsed: Duration,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub kind: TracerKind,
    pub viewport: Rect,
    /// Scene generation the frame was rendered from
    pub generation: u64,
    /// Tiles in dispatch order. Whole-viewport variants report a single tile.
    pub tiles: Vec<TileReport>,
    pub elapsed: Duration,
}

impl FrameReport {
    /// True when every tile completed.
    pub fn is_complete(&self) -> bool {
        self.tiles.iter().all(|t| t.outcome.is_completed())
    }

    pub fn failed_tiles(&self) -> impl Iterator<Item = &TileReport> {
        self.tiles.iter().filter(|t| !t.outcome.is_completed())
    }

    pub fn completed_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.outcome.is_completed()).count()
    }
}

/// A strategy for rendering the scene into a bound texture.
pub trait Tracer: Send {
    fn kind(&self) -> TracerKind;

    /// Bind the texture subsequent frames are written into.
    fn set_render_target(&mut self, target: SharedTexture);

    fn render_target(&self) -> Option<&SharedTexture>;

    /// Render one frame of `camera`'s viewport into the bound target.
    ///
    /// The scene stays read-locked and the target locked for the whole frame.
    fn render(&mut self, camera: &Camera) -> RenderResult<FrameReport>;
}

/// Collaborators every variant needs.
#[derive(Debug, Clone)]
pub(crate) struct FrameSource {
    scene: SharedScene,
    sampler: Arc<Sampler>,
    target: Option<SharedTexture>,
}

impl FrameSource {
    pub(crate) fn new(scene: SharedScene, sampler: Arc<Sampler>) -> Self {
        Self {
            scene,
            sampler,
            target: None,
        }
    }

    /// Lock scene and target, build the kernel and hand both to `body`.
    ///
    /// `body` returns the per-tile outcomes; an `Err` aborts the frame.
    pub(crate) fn run_frame<F>(
        &self,
        kind: TracerKind,
        camera: &Camera,
        body: F,
    ) -> RenderResult<FrameReport>
    where
        F: FnOnce(&PixelKernel<'_>, &mut TextureLock<'_>) -> RenderResult<Vec<TileReport>>,
    {
        let start = Instant::now();
        let target = self.target.as_ref().ok_or(RenderError::UnboundTarget)?;

        let scene = self.scene.read();
        let generation = scene.generation();
        let kernel = PixelKernel::new(&scene, camera, &self.sampler);
        let viewport = kernel.viewport();

        let mut texture = target.lock();
        if !texture.bounds().contains_rect(&viewport) {
            return Err(RenderError::RegionOutOfBounds {
                region: viewport,
                width: texture.width(),
                height: texture.height(),
            });
        }

        let mut frame = texture.lock();
        let tiles = body(&kernel, &mut frame)?;
        frame.unlock();
        drop(texture);

        debug_assert_eq!(scene.generation(), generation);

        let report = FrameReport {
            kind,
            viewport,
            generation,
            tiles,
            elapsed: start.elapsed(),
        };
        debug!(
            "{} frame {}x{} ({} nodes, {} samples) in {:.2?}",
            kind,
            viewport.width,
            viewport.height,
            kernel.node_count(),
            self.sampler.len(),
            report.elapsed
        );
        Ok(report)
    }
}

/// Configures and creates a [`Tracer`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lumo_core::reference_scene;
/// use lumo_renderer::{Sampler, TracerBuilder, TracerKind};
///
/// let tracer = TracerBuilder::new(TracerKind::Software)
///     .with_scene(reference_scene().into_shared())
///     .with_sampler(Arc::new(Sampler::jittered(4, 0).unwrap()))
///     .build()
///     .unwrap();
/// assert_eq!(tracer.kind(), TracerKind::Software);
/// ```
#[derive(Default)]
pub struct TracerBuilder {
    kind: TracerKind,
    scene: Option<SharedScene>,
    sampler: Option<Arc<Sampler>>,
    driver: Option<Arc<dyn GraphicsDriver>>,
    tiling: TilingConfig,
    target: Option<SharedTexture>,
}

impl TracerBuilder {
    pub fn new(kind: TracerKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_scene(mut self, scene: SharedScene) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn with_sampler(mut self, sampler: Arc<Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn with_driver(mut self, driver: Arc<dyn GraphicsDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_tiling(mut self, tiling: TilingConfig) -> Self {
        self.tiling = tiling;
        self
    }

    /// Bind a render target up front.
    pub fn with_target(mut self, target: SharedTexture) -> Self {
        self.target = Some(target);
        self
    }

    pub fn build(self) -> RenderResult<Box<dyn Tracer>> {
        let scene = self.scene.ok_or(RenderError::MissingScene)?;
        let sampler = self.sampler.ok_or(RenderError::MissingSampler)?;

        let driver = match (&self.driver, self.kind.needs_driver()) {
            (Some(driver), _) => Some(driver.as_ref()),
            (None, false) => None,
            (None, true) => return Err(RenderError::MissingDriver(self.kind)),
        };

        let mut tracer: Box<dyn Tracer> = match (self.kind, driver) {
            (TracerKind::Software, _) => Box::new(SoftwareTracer::new(scene, sampler)),
            (TracerKind::Hardware, Some(driver)) => {
                Box::new(HardwareTracer::new(scene, sampler, driver)?)
            }
            (TracerKind::MultiHardware, Some(driver)) => {
                Box::new(MultiHardwareTracer::new(scene, sampler, driver, self.tiling)?)
            }
            (kind, None) => return Err(RenderError::MissingDriver(kind)),
        };

        if let Some(target) = self.target {
            tracer.set_render_target(target);
        }

        match &self.driver {
            Some(driver) if self.kind.needs_driver() => {
                info!("Created {} tracer on driver '{}'", self.kind, driver.name())
            }
            _ => info!("Created {} tracer", self.kind),
        }

        Ok(tracer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDriver;
    use crate::error::ErrorCategory;
    use crate::target::Texture;
    use lumo_core::reference_scene;

    fn sampler() -> Arc<Sampler> {
        Arc::new(Sampler::jittered(1, 0).unwrap())
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            TracerKind::Software,
            TracerKind::Hardware,
            TracerKind::MultiHardware,
        ] {
            assert_eq!(kind.name().parse::<TracerKind>().unwrap(), kind);
        }
        assert!("gpu".parse::<TracerKind>().is_err());
        assert_eq!(
            serde_json::to_string(&TracerKind::MultiHardware).unwrap(),
            "\"multi-hardware\""
        );
    }

    #[test]
    fn test_builder_requires_scene_and_sampler() {
        let err = TracerBuilder::new(TracerKind::Software)
            .with_sampler(sampler())
            .build()
            .err()
            .unwrap();
        assert_eq!(err, RenderError::MissingScene);

        let err = TracerBuilder::new(TracerKind::Software)
            .with_scene(reference_scene().into_shared())
            .build()
            .err()
            .unwrap();
        assert_eq!(err, RenderError::MissingSampler);
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn test_builder_requires_driver_for_hardware() {
        for kind in [TracerKind::Hardware, TracerKind::MultiHardware] {
            let err = TracerBuilder::new(kind)
                .with_scene(reference_scene().into_shared())
                .with_sampler(sampler())
                .build()
                .err()
                .unwrap();
            assert_eq!(err, RenderError::MissingDriver(kind));
        }
    }

    #[test]
    fn test_default_tiling_is_usable() {
        let tiling = TilingConfig::default();
        assert_eq!(tiling.tile_size, DEFAULT_TILE_SIZE);
        assert!(tiling.contexts >= 1);
        tiling.validate().unwrap();
    }

    #[test]
    fn test_builder_rejects_bad_tiling() {
        let err = TracerBuilder::new(TracerKind::MultiHardware)
            .with_scene(reference_scene().into_shared())
            .with_sampler(sampler())
            .with_driver(Arc::new(HostDriver::new(1)))
            .with_tiling(TilingConfig {
                tile_size: 0,
                contexts: 2,
            })
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::InvalidTiling(_)));
    }

    #[test]
    fn test_render_without_target_fails() {
        let mut tracer = TracerBuilder::new(TracerKind::Software)
            .with_scene(reference_scene().into_shared())
            .with_sampler(sampler())
            .build()
            .unwrap();

        let err = tracer.render(&Camera::new()).unwrap_err();
        assert_eq!(err, RenderError::UnboundTarget);
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn test_viewport_must_fit_target() {
        let target = Texture::rgba8(100, 100).unwrap().into_shared();
        let mut tracer = TracerBuilder::new(TracerKind::Software)
            .with_scene(reference_scene().into_shared())
            .with_sampler(sampler())
            .with_target(target.clone())
            .build()
            .unwrap();

        // Default viewport is 320x200
        let err = tracer.render(&Camera::new()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Bounds);
        assert_eq!(target.lock().revision(), 0);
    }

    #[test]
    fn test_report_helpers() {
        let tile = Tile::covering(Rect::from_size(2, 2));
        let report = FrameReport {
            kind: TracerKind::MultiHardware,
            viewport: Rect::from_size(2, 2),
            generation: 0,
            tiles: vec![
                TileReport {
                    tile,
                    context: 0,
                    outcome: TileOutcome::Completed,
                    elapsed: Duration::ZERO,
                },
                TileReport {
                    tile,
                    context: 1,
                    outcome: TileOutcome::Failed(RenderError::UnboundTarget),
                    elapsed: Duration::ZERO,
                },
            ],
            elapsed: Duration::ZERO,
        };

        assert!(!report.is_complete());
        assert_eq!(report.completed_count(), 1);
        assert_eq!(report.failed_tiles().count(), 1);
    }
}
