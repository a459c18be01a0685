//! Tracer dispatching the whole viewport to one execution context.

use std::sync::Arc;
use std::time::Instant;

use log::trace;
use lumo_core::SharedScene;

use super::{FrameReport, FrameSource, TileOutcome, TileReport, Tracer, TracerKind};
use crate::camera::Camera;
use crate::device::{ComputeContext, GraphicsDriver};
use crate::error::RenderResult;
use crate::sampler::Sampler;
use crate::target::SharedTexture;
use crate::tile::{split_tiles, Tile};

pub struct HardwareTracer {
    source: FrameSource,
    context: Box<dyn ComputeContext>,
}

impl HardwareTracer {
    /// Create the tracer, acquiring context 0 from `driver`.
    pub fn new(
        scene: SharedScene,
        sampler: Arc<Sampler>,
        driver: &dyn GraphicsDriver,
    ) -> RenderResult<Self> {
        let context = driver.create_context(0)?;
        Ok(Self {
            source: FrameSource::new(scene, sampler),
            context,
        })
    }

    pub fn context(&self) -> &dyn ComputeContext {
        self.context.as_ref()
    }
}

impl Tracer for HardwareTracer {
    fn kind(&self) -> TracerKind {
        TracerKind::Hardware
    }

    fn set_render_target(&mut self, target: SharedTexture) {
        self.source.target = Some(target);
    }

    fn render_target(&self) -> Option<&SharedTexture> {
        self.source.target.as_ref()
    }

    fn render(&mut self, camera: &Camera) -> RenderResult<FrameReport> {
        let context = self.context.as_ref();

        self.source
            .run_frame(TracerKind::Hardware, camera, |kernel, frame| {
                let start = Instant::now();
                let tile = Tile::covering(kernel.viewport());
                let (width, height) = (frame.width(), frame.height());

                let mut views = split_tiles(frame.pixels_mut(), width, height, &[tile])?;
                for view in &mut views {
                    context.dispatch(view, kernel)?;
                }

                let elapsed = start.elapsed();
                trace!("Context '{}' finished viewport in {:.2?}", context.label(), elapsed);

                Ok(vec![TileReport {
                    tile,
                    context: 0,
                    outcome: TileOutcome::Completed,
                    elapsed,
                }])
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDriver;
    use crate::error::RenderError;
    use crate::target::Texture;
    use crate::tracer::SoftwareTracer;
    use lumo_core::reference_scene;
    use lumo_math::{Rect, Vec3};

    #[test]
    fn test_hardware_matches_software() {
        let scene = reference_scene().into_shared();
        let sampler = Arc::new(Sampler::jittered(4, 21).unwrap());
        let mut camera = Camera::new();
        camera
            .set_orientation(Vec3::new(0.0, 0.0, -75.0), Vec3::ZERO)
            .unwrap();
        camera.set_viewport(Rect::from_size(64, 48)).unwrap();

        let software_target = Texture::rgba8(64, 48).unwrap().into_shared();
        let mut software = SoftwareTracer::new(scene.clone(), sampler.clone());
        software.set_render_target(software_target.clone());
        software.render(&camera).unwrap();

        let hardware_target = Texture::rgba8(64, 48).unwrap().into_shared();
        let mut hardware = HardwareTracer::new(scene, sampler, &HostDriver::new(2)).unwrap();
        hardware.set_render_target(hardware_target.clone());
        let report = hardware.render(&camera).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.kind, TracerKind::Hardware);
        assert_eq!(
            software_target.lock().pixels(),
            hardware_target.lock().pixels()
        );
    }

    struct BrokenDriver;

    impl GraphicsDriver for BrokenDriver {
        fn name(&self) -> &str {
            "broken"
        }

        fn create_context(&self, index: usize) -> RenderResult<Box<dyn ComputeContext>> {
            Err(RenderError::ContextCreation {
                index,
                reason: "no device".into(),
            })
        }
    }

    #[test]
    fn test_context_creation_failure_propagates() {
        let err = HardwareTracer::new(
            reference_scene().into_shared(),
            Arc::new(Sampler::jittered(1, 0).unwrap()),
            &BrokenDriver,
        )
        .err()
        .unwrap();
        assert!(matches!(err, RenderError::ContextCreation { index: 0, .. }));
    }
}
