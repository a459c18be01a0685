//! Lumo renderer - ray casting into a render target.
//!
//! Casts one ray per sub-pixel sample from a [`Camera`], resolves the nearest
//! hit against a flattened [`lumo_core::Scene`] and shades it with a simple
//! facing-ratio model. Three [`Tracer`] variants schedule that same per-pixel
//! work differently:
//!
//! - **software**: sequential, on the calling thread
//! - **hardware**: one execution context from a [`GraphicsDriver`]
//! - **multi-hardware**: disjoint tiles over several contexts in parallel
//!
//! All variants produce identical images for the same inputs.

mod camera;
mod device;
mod error;
mod kernel;
mod sampler;
mod target;
mod tile;
mod tracer;

pub use camera::{Camera, Projection, RayCaster};
pub use device::{ComputeContext, GraphicsDriver, HostContext, HostDriver};
pub use error::{ErrorCategory, RenderError, RenderResult};
pub use kernel::{shade, PixelKernel};
pub use sampler::{generate_samples, Sampler, DEFAULT_SAMPLE_COUNT};
pub use target::{
    ColorFormat, Extent, Rgba8, SharedTexture, Texture, TextureFactory, TextureLock, TextureType,
};
pub use tile::{generate_tiles, split_tiles, Tile, TileView, DEFAULT_TILE_SIZE};
pub use tracer::{
    FrameReport, HardwareTracer, MultiHardwareTracer, SoftwareTracer, TileOutcome, TileReport,
    TilingConfig, Tracer, TracerBuilder, TracerKind,
};

/// Re-export math types used throughout the public API.
pub use lumo_math::{Rect, Vec2, Vec3, Vec4};
