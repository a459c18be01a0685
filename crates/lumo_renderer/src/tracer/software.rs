//! Sequential tracer running on the calling thread.

use std::sync::Arc;
use std::time::Instant;

use lumo_core::SharedScene;

use super::{FrameReport, FrameSource, TileOutcome, TileReport, Tracer, TracerKind};
use crate::camera::Camera;
use crate::error::RenderResult;
use crate::sampler::Sampler;
use crate::target::SharedTexture;
use crate::tile::Tile;

/// Renders every viewport pixel in one pass, writing straight into the
/// locked target.
#[derive(Debug, Clone)]
pub struct SoftwareTracer {
    source: FrameSource,
}

impl SoftwareTracer {
    pub fn new(scene: SharedScene, sampler: Arc<Sampler>) -> Self {
        Self {
            source: FrameSource::new(scene, sampler),
        }
    }
}

impl Tracer for SoftwareTracer {
    fn kind(&self) -> TracerKind {
        TracerKind::Software
    }

    fn set_render_target(&mut self, target: SharedTexture) {
        self.source.target = Some(target);
    }

    fn render_target(&self) -> Option<&SharedTexture> {
        self.source.target.as_ref()
    }

    fn render(&mut self, camera: &Camera) -> RenderResult<FrameReport> {
        self.source
            .run_frame(TracerKind::Software, camera, |kernel, frame| {
                let start = Instant::now();
                let viewport = kernel.viewport();

                for y in viewport.y..viewport.bottom() {
                    for x in viewport.x..viewport.right() {
                        frame.put(x, y, kernel.shade_pixel(x, y)?);
                    }
                }

                Ok(vec![TileReport {
                    tile: Tile::covering(viewport),
                    context: 0,
                    outcome: TileOutcome::Completed,
                    elapsed: start.elapsed(),
                }])
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Rgba8, Texture};
    use lumo_core::{Material, Scene, SceneNode, Sphere};
    use lumo_math::{Rect, Vec3, Vec4};

    #[test]
    fn test_renders_viewport_only() {
        let mut scene = Scene::new("bg");
        scene.set_background(Vec4::new(1.0, 0.0, 0.0, 1.0));

        let target = Texture::rgba8(6, 6).unwrap().into_shared();
        let mut tracer = SoftwareTracer::new(
            scene.into_shared(),
            Arc::new(Sampler::jittered(2, 1).unwrap()),
        );
        tracer.set_render_target(target.clone());

        let mut camera = Camera::new();
        camera.set_viewport(Rect::new(2, 2, 3, 3)).unwrap();
        let report = tracer.render(&camera).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.tiles.len(), 1);

        let texture = target.lock();
        assert_eq!(texture.revision(), 1);
        assert_eq!(texture.pixel(3, 3).unwrap(), Rgba8::new(255, 0, 0, 255));
        assert_eq!(texture.pixel(1, 1).unwrap(), Rgba8::BLACK);
        assert_eq!(texture.pixel(5, 5).unwrap(), Rgba8::BLACK);
    }

    #[test]
    fn test_missing_material_aborts_frame() {
        let mut scene = Scene::new("bare");
        scene.root_mut().add_child(
            SceneNode::new("ball").with_data(Sphere::new(Vec3::ZERO, 1.0), Material::new("bare")),
        );

        let mut tracer = SoftwareTracer::new(
            scene.into_shared(),
            Arc::new(Sampler::jittered(1, 0).unwrap()),
        );
        tracer.set_render_target(Texture::rgba8(320, 200).unwrap().into_shared());

        // Default camera looks straight at the sphere
        assert!(tracer.render(&Camera::new()).is_err());
    }
}
