//! Renderer error types.

use lumo_core::SceneError;
use lumo_math::{Rect, Vec3};
use thiserror::Error;

use crate::target::{ColorFormat, TextureType};
use crate::tracer::TracerKind;

/// Broad class of a [`RenderError`], used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid setup value; fix the input and retry.
    Configuration,
    /// A required collaborator is missing or was lost. Fatal for the frame.
    Resource,
    /// A pixel or region falls outside the render target.
    Bounds,
    /// The scene could not be shaded (missing material data).
    Shading,
}

/// Errors produced while configuring or running a tracer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("camera position and look-at target coincide at {0}")]
    DegenerateOrientation(Vec3),

    #[error("camera up vector must be finite and non-zero")]
    ZeroUpVector,

    #[error("viewport {0:?} has no area")]
    EmptyViewport(Rect),

    #[error("sampler needs at least one sample")]
    EmptySampler,

    #[error("invalid tiling: {0}")]
    InvalidTiling(String),

    #[error("unsupported texture: {texture_type:?} with format {format:?}")]
    UnsupportedTexture {
        texture_type: TextureType,
        format: ColorFormat,
    },

    #[error("texture extent {width}x{height} has no area")]
    EmptyExtent { width: u32, height: u32 },

    #[error("no render target bound")]
    UnboundTarget,

    #[error("tracer needs a scene")]
    MissingScene,

    #[error("tracer needs a sampler")]
    MissingSampler,

    #[error("{0} tracer needs a graphics driver")]
    MissingDriver(TracerKind),

    #[error("failed to create execution context {index}: {reason}")]
    ContextCreation { index: usize, reason: String },

    #[error("execution context `{context}` lost: {reason}")]
    ContextLost { context: String, reason: String },

    #[error("pixel ({x}, {y}) outside the {width}x{height} target")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("region {region:?} does not fit the {width}x{height} target")]
    RegionOutOfBounds { region: Rect, width: u32, height: u32 },

    #[error("tiles {first:?} and {second:?} overlap")]
    OverlappingTiles { first: Rect, second: Rect },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl RenderError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RenderError::DegenerateOrientation(_)
            | RenderError::ZeroUpVector
            | RenderError::EmptyViewport(_)
            | RenderError::EmptySampler
            | RenderError::InvalidTiling(_)
            | RenderError::UnsupportedTexture { .. }
            | RenderError::EmptyExtent { .. } => ErrorCategory::Configuration,

            RenderError::UnboundTarget
            | RenderError::MissingScene
            | RenderError::MissingSampler
            | RenderError::MissingDriver(_)
            | RenderError::ContextCreation { .. }
            | RenderError::ContextLost { .. } => ErrorCategory::Resource,

            RenderError::PixelOutOfBounds { .. }
            | RenderError::RegionOutOfBounds { .. }
            | RenderError::OverlappingTiles { .. } => ErrorCategory::Bounds,

            RenderError::Scene(SceneError::MissingProperty { .. }) => ErrorCategory::Shading,
            RenderError::Scene(SceneError::NodeNotFound(_)) => ErrorCategory::Configuration,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            RenderError::DegenerateOrientation(Vec3::ZERO).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(RenderError::UnboundTarget.category(), ErrorCategory::Resource);
        assert_eq!(
            RenderError::RegionOutOfBounds {
                region: Rect::from_size(10, 10),
                width: 5,
                height: 5
            }
            .category(),
            ErrorCategory::Bounds
        );
    }

    #[test]
    fn test_missing_property_is_shading() {
        let err: RenderError = SceneError::MissingProperty {
            material: "bare".into(),
            property: "diffuse".into(),
        }
        .into();

        assert_eq!(err.category(), ErrorCategory::Shading);
        assert!(err.to_string().contains("diffuse"));
    }
}
