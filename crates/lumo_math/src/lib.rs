// Re-export glam for convenience
pub use glam::*;

// Lumo math types
mod aabb;
mod interval;
mod ray;
mod rect;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use rect::Rect;

/// Clamp a value to the [0, 1] range.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec4_channels() {
        let v = Vec4::new(1.0, 0.5, 0.25, 1.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.w, 1.0);
        assert_eq!(v * 0.5, Vec4::new(0.5, 0.25, 0.125, 0.5));
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
    }
}
