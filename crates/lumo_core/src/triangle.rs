//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use lumo_math::{Aabb, Interval, Ray, Vec3};

use crate::geometry::{Geometry, GeometryKind, SurfaceHit};

/// Ray parameters accepted as a hit. The lower bound skips self-intersections.
const HIT_RANGE: Interval = Interval {
    min: 1e-6,
    max: f32::INFINITY,
};

/// A single triangle with a flat face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, zero for degenerate triangles)
    normal: Vec3,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The face normal follows the right-hand rule over (v0, v1, v2).
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self { v0, v1, v2, normal }
    }

    /// The three vertices.
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// The face normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Geometry for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle (or the triangle has no area)
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !Interval::UNIT.contains(u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !HIT_RANGE.surrounds(t) {
            return None;
        }

        Some(SurfaceHit {
            distance: t * ray.direction().length(),
            normal: self.normal,
        })
    }

    fn bounds(&self) -> Aabb {
        let min = self.v0.min(self.v1).min(self.v2);
        let max = self.v0.max(self.v1).max(self.v2);
        Aabb::from_points(min, max)
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Triangle
    }
}
