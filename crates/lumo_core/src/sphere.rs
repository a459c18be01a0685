//! Sphere primitive for ray tracing.

use lumo_math::{Aabb, Interval, Ray, Vec3};

use crate::geometry::{Geometry, GeometryKind, SurfaceHit};

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// Negative radii are clamped to zero instead of being rejected.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Get the sphere center.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Get the sphere radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Move the sphere.
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Resize the sphere, clamping negative radii to zero.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

impl Geometry for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let length = ray.direction().length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }

        // Solve t^2 + Bt + C = 0 along the unit direction
        let d = ray.direction() / length;
        let r0_sub_c = ray.origin() - self.center;
        let b = 2.0 * d.dot(r0_sub_c);
        let c = r0_sub_c.length_squared() - self.radius * self.radius;

        let disc = b * b - 4.0 * c;

        let t = if disc < 0.0 {
            return None;
        } else if disc == 0.0 {
            // Tangent ray: a single touching point
            -b / 2.0
        } else {
            let root_disc = disc.sqrt();
            let t1 = (-b - root_disc) / 2.0;
            let t2 = (-b + root_disc) / 2.0;

            // t1 <= t2; fall back to the far root when the origin is inside
            if Interval::POSITIVE.surrounds(t1) {
                t1
            } else {
                t2
            }
        };

        // NaN falls outside too
        if !Interval::POSITIVE.surrounds(t) {
            return None;
        }

        let point = ray.origin() + d * t;
        let normal = (point - self.center).normalize_or_zero();

        Some(SurfaceHit {
            distance: t,
            normal,
        })
    }

    fn bounds(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Sphere
    }
}
