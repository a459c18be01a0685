//! Camera for ray generation.
//!
//! The camera is a plain value: position, look-at target, up vector, the
//! viewport it renders into and a projection descriptor. Per frame it is
//! turned into a [`RayCaster`] holding the orthonormal basis, so no derived
//! state is cached on the camera itself.

use lumo_math::{Ray, Rect, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// How screen positions map to rays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    /// All rays leave the eye; the image plane sits `focal_distance` ahead.
    Perspective { focal_distance: f32, pixel_size: f32 },
    /// Parallel rays along the view direction, one origin per pixel.
    Orthographic { pixel_size: f32 },
}

impl Projection {
    pub fn perspective(focal_distance: f32) -> Self {
        Projection::Perspective {
            focal_distance,
            pixel_size: 1.0,
        }
    }

    pub fn orthographic(pixel_size: f32) -> Self {
        Projection::Orthographic { pixel_size }
    }

    /// World-space size of one pixel on the image plane.
    pub fn pixel_size(&self) -> f32 {
        match *self {
            Projection::Perspective { pixel_size, .. } => pixel_size,
            Projection::Orthographic { pixel_size } => pixel_size,
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::perspective(150.0)
    }
}

/// Camera for generating rays into the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    look_at: Vec3,
    up: Vec3,
    viewport: Rect,
    projection: Projection,
}

impl Camera {
    /// Create a camera at (0, 0, -2) looking at the origin.
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -2.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            viewport: Rect::from_size(320, 200),
            projection: Projection::default(),
        }
    }

    /// Set position and look-at target together.
    pub fn set_orientation(&mut self, position: Vec3, look_at: Vec3) -> RenderResult<()> {
        check_orientation(position, look_at)?;
        self.position = position;
        self.look_at = look_at;
        Ok(())
    }

    pub fn set_position(&mut self, position: Vec3) -> RenderResult<()> {
        self.set_orientation(position, self.look_at)
    }

    pub fn set_look_at(&mut self, look_at: Vec3) -> RenderResult<()> {
        self.set_orientation(self.position, look_at)
    }

    /// Set the up vector. It is stored normalized.
    pub fn set_up(&mut self, up: Vec3) -> RenderResult<()> {
        let up = up.try_normalize().ok_or(RenderError::ZeroUpVector)?;
        self.up = up;
        Ok(())
    }

    /// Set the pixel region of the render target this camera draws into.
    pub fn set_viewport(&mut self, viewport: Rect) -> RenderResult<()> {
        if viewport.is_empty() {
            return Err(RenderError::EmptyViewport(viewport));
        }
        self.viewport = viewport;
        Ok(())
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position)
            .try_normalize()
            .unwrap_or(Vec3::Z)
    }

    /// Compute the frame's basis and return a ray generator.
    pub fn ray_caster(&self) -> RayCaster {
        let forward = self.forward();

        // Up parallel to the view direction: any perpendicular will do
        let right = self
            .up
            .cross(forward)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector());
        let up = forward.cross(right);

        RayCaster {
            eye: self.position,
            forward,
            right,
            up,
            viewport: self.viewport,
            half_width: self.viewport.width as f32 / 2.0,
            half_height: self.viewport.height as f32 / 2.0,
            projection: self.projection,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

fn check_orientation(position: Vec3, look_at: Vec3) -> RenderResult<()> {
    // Negated so NaN coordinates are rejected too
    if !((look_at - position).length_squared() > 0.0) {
        return Err(RenderError::DegenerateOrientation(position));
    }
    Ok(())
}

/// Per-frame ray generator derived from a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCaster {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    viewport: Rect,
    half_width: f32,
    half_height: f32,
    projection: Projection,
}

impl RayCaster {
    /// Ray through pixel `(px, py)` at sub-pixel offset `sample` in [0,1)².
    ///
    /// Pixel coordinates are absolute target coordinates. Rows grow downwards
    /// on the target and upwards in the world.
    pub fn cast(&self, px: u32, py: u32, sample: Vec2) -> Ray {
        let local_x = px as f32 - self.viewport.x as f32 + sample.x;
        let local_y = py as f32 - self.viewport.y as f32 + sample.y;

        let pixel_size = self.projection.pixel_size();
        let sx = (local_x - self.half_width) * pixel_size;
        let sy = (self.half_height - local_y) * pixel_size;
        let offset = self.right * sx + self.up * sy;

        match self.projection {
            Projection::Perspective { focal_distance, .. } => {
                Ray::new(self.eye, self.forward * focal_distance + offset)
            }
            Projection::Orthographic { .. } => Ray::new(self.eye + offset, self.forward),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.forward, self.right, self.up)
    }
}
