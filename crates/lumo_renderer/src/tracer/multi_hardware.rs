//! Tracer spreading viewport tiles over several execution contexts.
//!
//! Tiles are assigned round-robin in spiral order, so every context starts
//! near the centre of the image. Each context runs on its own scoped thread
//! and owns its tiles' row slices outright; the scope join is the frame
//! barrier. A tile that fails is recorded in the report and leaves the other
//! tiles untouched.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use lumo_core::SharedScene;

use super::{FrameReport, FrameSource, TileOutcome, TileReport, TilingConfig, Tracer, TracerKind};
use crate::camera::Camera;
use crate::device::{ComputeContext, GraphicsDriver};
use crate::error::{RenderError, RenderResult};
use crate::kernel::PixelKernel;
use crate::sampler::Sampler;
use crate::target::SharedTexture;
use crate::tile::{generate_tiles, split_tiles, Tile, TileView};

pub struct MultiHardwareTracer {
    source: FrameSource,
    contexts: Vec<Box<dyn ComputeContext>>,
    tiling: TilingConfig,
}

impl MultiHardwareTracer {
    /// Create the tracer, acquiring `tiling.contexts` contexts from `driver`.
    pub fn new(
        scene: SharedScene,
        sampler: Arc<Sampler>,
        driver: &dyn GraphicsDriver,
        tiling: TilingConfig,
    ) -> RenderResult<Self> {
        tiling.validate()?;

        let contexts = (0..tiling.contexts)
            .map(|index| driver.create_context(index))
            .collect::<RenderResult<Vec<_>>>()?;

        Ok(Self {
            source: FrameSource::new(scene, sampler),
            contexts,
            tiling,
        })
    }

    pub fn tiling(&self) -> TilingConfig {
        self.tiling
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}

impl Tracer for MultiHardwareTracer {
    fn kind(&self) -> TracerKind {
        TracerKind::MultiHardware
    }

    fn set_render_target(&mut self, target: SharedTexture) {
        self.source.target = Some(target);
    }

    fn render_target(&self) -> Option<&SharedTexture> {
        self.source.target.as_ref()
    }

    fn render(&mut self, camera: &Camera) -> RenderResult<FrameReport> {
        let contexts = &self.contexts;
        let tile_size = self.tiling.tile_size;

        let report = self
            .source
            .run_frame(TracerKind::MultiHardware, camera, |kernel, frame| {
                let tiles = generate_tiles(kernel.viewport(), tile_size);
                let (width, height) = (frame.width(), frame.height());
                let views = split_tiles(frame.pixels_mut(), width, height, &tiles)?;

                debug!(
                    "Dispatching {} tiles of {}px over {} contexts",
                    tiles.len(),
                    tile_size,
                    contexts.len()
                );

                let mut queues: Vec<Vec<TileView<'_>>> =
                    contexts.iter().map(|_| Vec::new()).collect();
                for (i, view) in views.into_iter().enumerate() {
                    queues[i % contexts.len()].push(view);
                }

                let mut reports = run_workers(contexts, queues, kernel);
                reports.sort_by_key(|r| r.tile.index);
                Ok(reports)
            })?;

        if !report.is_complete() {
            warn!(
                "Frame incomplete: {} of {} tiles failed",
                report.failed_tiles().count(),
                report.tiles.len()
            );
        }

        Ok(report)
    }
}

/// Run each queue on its own scoped thread and gather the tile reports.
fn run_workers(
    contexts: &[Box<dyn ComputeContext>],
    queues: Vec<Vec<TileView<'_>>>,
    kernel: &PixelKernel<'_>,
) -> Vec<TileReport> {
    let assigned: Vec<Vec<Tile>> = queues
        .iter()
        .map(|queue| queue.iter().map(TileView::tile).collect())
        .collect();

    thread::scope(|scope| {
        let handles: Vec<_> = queues
            .into_iter()
            .zip(contexts)
            .enumerate()
            .map(|(index, (queue, context))| {
                let context = context.as_ref();
                scope.spawn(move || run_queue(index, context, queue, kernel))
            })
            .collect();

        handles
            .into_iter()
            .zip(assigned)
            .enumerate()
            .flat_map(|(index, (handle, tiles))| match handle.join() {
                Ok(reports) => reports,
                Err(_) => {
                    let label = contexts[index].label().to_string();
                    warn!("Worker for context '{}' panicked", label);
                    tiles
                        .into_iter()
                        .map(|tile| TileReport {
                            tile,
                            context: index,
                            outcome: TileOutcome::Failed(RenderError::ContextLost {
                                context: label.clone(),
                                reason: "worker panicked".into(),
                            }),
                            elapsed: Duration::ZERO,
                        })
                        .collect()
                }
            })
            .collect()
    })
}

fn run_queue(
    index: usize,
    context: &dyn ComputeContext,
    queue: Vec<TileView<'_>>,
    kernel: &PixelKernel<'_>,
) -> Vec<TileReport> {
    queue
        .into_iter()
        .map(|mut view| {
            let start = Instant::now();
            let tile = view.tile();

            let outcome = match context.dispatch(&mut view, kernel) {
                Ok(()) => TileOutcome::Completed,
                Err(err) => {
                    warn!(
                        "Tile {} at ({}, {}) failed on '{}': {}",
                        tile.index,
                        tile.x,
                        tile.y,
                        context.label(),
                        err
                    );
                    TileOutcome::Failed(err)
                }
            };

            let elapsed = start.elapsed();
            trace!(
                "Tile {} on '{}' took {:.2?}",
                tile.index,
                context.label(),
                elapsed
            );

            TileReport {
                tile,
                context: index,
                outcome,
                elapsed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDriver;
    use crate::target::Texture;
    use lumo_core::reference_scene;
    use lumo_math::{Rect, Vec3};

    fn tracer(contexts: usize, tile_size: u32) -> MultiHardwareTracer {
        MultiHardwareTracer::new(
            reference_scene().into_shared(),
            Arc::new(Sampler::jittered(4, 8).unwrap()),
            &HostDriver::new(1),
            TilingConfig {
                tile_size,
                contexts,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_creates_requested_contexts() {
        let tracer = tracer(3, 16);
        assert_eq!(tracer.context_count(), 3);
        assert_eq!(tracer.tiling().tile_size, 16);
    }

    #[test]
    fn test_zero_contexts_rejected() {
        let err = MultiHardwareTracer::new(
            reference_scene().into_shared(),
            Arc::new(Sampler::jittered(1, 0).unwrap()),
            &HostDriver::new(1),
            TilingConfig {
                tile_size: 8,
                contexts: 0,
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, RenderError::InvalidTiling(_)));
    }

    #[test]
    fn test_round_robin_assignment() {
        let mut tracer = tracer(3, 10);
        tracer.set_render_target(Texture::rgba8(40, 30).unwrap().into_shared());

        let mut camera = Camera::new();
        camera
            .set_orientation(Vec3::new(0.0, 0.0, -75.0), Vec3::ZERO)
            .unwrap();
        camera.set_viewport(Rect::from_size(40, 30)).unwrap();

        let report = tracer.render(&camera).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.tiles.len(), 12);
        for (i, tile) in report.tiles.iter().enumerate() {
            assert_eq!(tile.tile.index, i);
            assert_eq!(tile.context, i % 3);
        }
    }

    #[test]
    fn test_more_contexts_than_tiles() {
        let mut tracer = tracer(8, 64);
        let target = Texture::rgba8(32, 32).unwrap().into_shared();
        tracer.set_render_target(target.clone());

        let mut camera = Camera::new();
        camera.set_viewport(Rect::from_size(32, 32)).unwrap();

        let report = tracer.render(&camera).unwrap();
        assert_eq!(report.tiles.len(), 1);
        assert!(report.is_complete());
        assert_eq!(target.lock().revision(), 1);
    }
}
