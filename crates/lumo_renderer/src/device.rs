//! Graphics drivers and execution contexts.
//!
//! A [`GraphicsDriver`] is the capability injected by the host application;
//! it hands out [`ComputeContext`]s that run the pixel kernel over a tile.
//! [`HostDriver`] is the built-in implementation, backed by one rayon
//! thread pool per context.

use log::debug;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};
use crate::kernel::PixelKernel;
use crate::target::{ColorFormat, Extent, Texture, TextureFactory, TextureType};
use crate::tile::TileView;

/// One execution context able to run the pixel kernel.
pub trait ComputeContext: Send + Sync {
    fn label(&self) -> &str;

    /// Shade every pixel of `view`.
    fn dispatch(&self, view: &mut TileView<'_>, kernel: &PixelKernel<'_>) -> RenderResult<()>;
}

/// Source of execution contexts.
pub trait GraphicsDriver: Send + Sync {
    fn name(&self) -> &str;

    fn create_context(&self, index: usize) -> RenderResult<Box<dyn ComputeContext>>;
}

/// Driver running contexts on the host CPU.
#[derive(Debug, Clone)]
pub struct HostDriver {
    threads_per_context: usize,
}

impl HostDriver {
    /// `threads_per_context == 0` lets rayon pick the thread count.
    pub fn new(threads_per_context: usize) -> Self {
        Self {
            threads_per_context,
        }
    }

    pub fn threads_per_context(&self) -> usize {
        self.threads_per_context
    }
}

impl Default for HostDriver {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GraphicsDriver for HostDriver {
    fn name(&self) -> &str {
        "host"
    }

    fn create_context(&self, index: usize) -> RenderResult<Box<dyn ComputeContext>> {
        let label = format!("host-{}", index);
        let thread_prefix = label.clone();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads_per_context)
            .thread_name(move |i| format!("{}-{}", thread_prefix, i))
            .build()
            .map_err(|e| RenderError::ContextCreation {
                index,
                reason: e.to_string(),
            })?;

        debug!(
            "Created context '{}' with {} threads",
            label,
            pool.current_num_threads()
        );

        Ok(Box::new(HostContext { label, pool }))
    }
}

impl TextureFactory for HostDriver {
    fn create_texture(
        &self,
        texture_type: TextureType,
        extent: Extent,
        format: ColorFormat,
    ) -> RenderResult<Texture> {
        Texture::new(texture_type, extent, format)
    }
}

/// Context owning a dedicated rayon pool; rows of a tile run in parallel.
#[derive(Debug)]
pub struct HostContext {
    label: String,
    pool: rayon::ThreadPool,
}

impl ComputeContext for HostContext {
    fn label(&self) -> &str {
        &self.label
    }

    fn dispatch(&self, view: &mut TileView<'_>, kernel: &PixelKernel<'_>) -> RenderResult<()> {
        let tile = view.tile();
        let rows = view.rows_mut();

        self.pool.install(|| {
            rows.par_iter_mut()
                .enumerate()
                .try_for_each(|(row, pixels)| {
                    let y = tile.y + row as u32;
                    for (col, pixel) in pixels.iter_mut().enumerate() {
                        *pixel = kernel.shade_pixel(tile.x + col as u32, y)?;
                    }
                    Ok(())
                })
        })
    }
}
