//! The per-pixel shading kernel shared by every tracer.
//!
//! All tracer variants run exactly this code for each pixel, so their
//! outputs match bit for bit.

use lumo_core::{intersect_ray, IntersectInfo, Scene, SceneNode, DIFFUSE};
use lumo_math::{clamp01, Ray, Rect, Vec4};

use crate::camera::{Camera, RayCaster};
use crate::error::RenderResult;
use crate::sampler::Sampler;
use crate::target::Rgba8;

/// Immutable per-frame state: flattened scene, ray caster and samples.
#[derive(Debug)]
pub struct PixelKernel<'a> {
    nodes: Vec<&'a SceneNode>,
    caster: RayCaster,
    sampler: &'a Sampler,
    background: Vec4,
}

impl<'a> PixelKernel<'a> {
    /// Flatten `scene` and capture the camera basis for one frame.
    pub fn new(scene: &'a Scene, camera: &Camera, sampler: &'a Sampler) -> Self {
        Self {
            nodes: scene.flatten_hierarchy(),
            caster: camera.ray_caster(),
            sampler,
            background: scene.background(),
        }
    }

    /// The viewport being rendered, in target pixels.
    pub fn viewport(&self) -> Rect {
        self.caster.viewport()
    }

    /// Number of geometry nodes considered per ray.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Color seen along `ray`: the shaded nearest hit, or the background.
    pub fn trace_ray(&self, ray: &Ray) -> RenderResult<Vec4> {
        match intersect_ray(&self.nodes, ray) {
            Some(hit) => shade(&hit, ray),
            None => Ok(self.background),
        }
    }

    /// Average color over all samples of pixel `(x, y)`.
    pub fn render_pixel(&self, x: u32, y: u32) -> RenderResult<Vec4> {
        let mut pixel_color = Vec4::ZERO;

        for &offset in self.sampler.samples() {
            let ray = self.caster.cast(x, y, offset);
            pixel_color += self.trace_ray(&ray)?;
        }

        Ok(pixel_color / self.sampler.len() as f32)
    }

    /// [`render_pixel`](Self::render_pixel) converted for the target.
    pub fn shade_pixel(&self, x: u32, y: u32) -> RenderResult<Rgba8> {
        Ok(Rgba8::from_color(self.render_pixel(x, y)?))
    }
}

/// Lambert-style facing ratio times the material's diffuse color.
pub fn shade(hit: &IntersectInfo<'_>, ray: &Ray) -> RenderResult<Vec4> {
    let diffuse = hit.material.property(DIFFUSE)?;
    let facing = clamp01(hit.normal.dot(-ray.direction().normalize_or_zero()));
    Ok(diffuse * facing)
}
