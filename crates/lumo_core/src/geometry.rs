//! Geometry trait and intersection records.

use std::fmt;

use lumo_math::{Aabb, Ray, Vec3};

use crate::Material;

/// The closed set of primitive kinds a scene can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Sphere,
    Triangle,
}

impl GeometryKind {
    /// Stable lowercase name, used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Sphere => "sphere",
            GeometryKind::Triangle => "triangle",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single ray/primitive test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Euclidean distance from the ray origin to the hit point (always > 0)
    pub distance: f32,
    /// Unit surface normal at the hit point
    pub normal: Vec3,
}

/// A resolved intersection against the scene.
///
/// Carries the material of the node that owns the hit geometry. There is no
/// "empty" value: a miss is represented by `None` at the call site.
#[derive(Debug, Clone, Copy)]
pub struct IntersectInfo<'a> {
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// Unit surface normal at the hit point
    pub normal: Vec3,
    /// Material of the node that was hit
    pub material: &'a Material,
}

/// Trait for primitives that can be intersected by rays.
pub trait Geometry: Send + Sync + fmt::Debug {
    /// Intersect a ray with this primitive.
    ///
    /// Returns the nearest hit strictly in front of the ray origin.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit>;

    /// Get the axis-aligned bounding box of this primitive.
    fn bounds(&self) -> Aabb;

    /// Which primitive this is.
    fn kind(&self) -> GeometryKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(GeometryKind::Sphere.name(), "sphere");
        assert_eq!(GeometryKind::Triangle.to_string(), "triangle");
    }
}
