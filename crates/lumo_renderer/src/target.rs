//! Render targets: textures the tracers write into.
//!
//! A [`Texture`] is a plain RGBA8 pixel buffer. Writers go through
//! [`Texture::lock`], which hands out a [`TextureLock`] with exclusive access
//! for its lifetime; unlocking (or dropping the lock) bumps the texture's
//! revision so presenters can tell a new frame arrived.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use lumo_math::{clamp01, Rect, Vec4};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// A texture shared between the application and a tracer.
pub type SharedTexture = Arc<Mutex<Texture>>;

/// One 8-bit RGBA pixel, laid out exactly as in the byte buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert a linear color, clamping each channel to [0, 1].
    pub fn from_color(color: Vec4) -> Self {
        Self {
            r: (255.0 * clamp01(color.x)) as u8,
            g: (255.0 * clamp01(color.y)) as u8,
            b: (255.0 * clamp01(color.z)) as u8,
            a: (255.0 * clamp01(color.w)) as u8,
        }
    }
}

/// Texture dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureType {
    Tex2D,
    Tex3D,
    TexCube,
}

/// Pixel storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFormat {
    R8G8B8A8,
    R16G16B16A16Float,
    R32G32B32A32Float,
}

/// Texture size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Anything that can allocate render targets.
pub trait TextureFactory {
    fn create_texture(
        &self,
        texture_type: TextureType,
        extent: Extent,
        format: ColorFormat,
    ) -> RenderResult<Texture>;
}

/// An RGBA8 render target.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    format: ColorFormat,
    pixels: Vec<Rgba8>,
    revision: u64,
}

impl Texture {
    /// Allocate a texture filled with opaque black.
    ///
    /// Only 2D RGBA8 textures with a non-zero extent are supported.
    pub fn new(texture_type: TextureType, extent: Extent, format: ColorFormat) -> RenderResult<Self> {
        if texture_type != TextureType::Tex2D || format != ColorFormat::R8G8B8A8 {
            return Err(RenderError::UnsupportedTexture {
                texture_type,
                format,
            });
        }
        if extent.width == 0 || extent.height == 0 {
            return Err(RenderError::EmptyExtent {
                width: extent.width,
                height: extent.height,
            });
        }

        let len = extent.width as usize * extent.height as usize;
        Ok(Self {
            width: extent.width,
            height: extent.height,
            format,
            pixels: vec![Rgba8::BLACK; len],
            revision: 0,
        })
    }

    /// Shorthand for a 2D RGBA8 texture.
    pub fn rgba8(width: u32, height: u32) -> RenderResult<Self> {
        Self::new(
            TextureType::Tex2D,
            Extent::new(width, height),
            ColorFormat::R8G8B8A8,
        )
    }

    /// Wrap into a [`SharedTexture`].
    pub fn into_shared(self) -> SharedTexture {
        Arc::new(Mutex::new(self))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// The full texture area, for viewport checks.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Number of completed lock/unlock cycles.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Overwrite every pixel. Counts as one write cycle.
    pub fn fill(&mut self, color: Rgba8) {
        self.lock().pixels_mut().fill(color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> RenderResult<Rgba8> {
        if x >= self.width || y >= self.height {
            return Err(RenderError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.pixels[self.index(x, y)])
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Raw bytes in row-major RGBA order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy into an `image` buffer for saving or display.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[self.index(x, y)];
            image::Rgba([p.r, p.g, p.b, p.a])
        })
    }

    /// Take exclusive write access until the returned lock is released.
    pub fn lock(&mut self) -> TextureLock<'_> {
        TextureLock { texture: self }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Scoped write access to a [`Texture`].
#[derive(Debug)]
pub struct TextureLock<'a> {
    texture: &'a mut Texture,
}

impl TextureLock<'_> {
    pub fn width(&self) -> u32 {
        self.texture.width
    }

    pub fn height(&self) -> u32 {
        self.texture.height
    }

    pub fn bounds(&self) -> Rect {
        self.texture.bounds()
    }

    /// Write one pixel. Coordinates must lie inside the texture.
    pub fn put(&mut self, x: u32, y: u32, color: Rgba8) {
        debug_assert!(
            x < self.texture.width && y < self.texture.height,
            "pixel ({}, {}) outside {}x{} texture",
            x,
            y,
            self.texture.width,
            self.texture.height
        );
        let index = self.texture.index(x, y);
        self.texture.pixels[index] = color;
    }

    /// The whole buffer, row-major.
    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.texture.pixels
    }

    /// Release the lock explicitly.
    pub fn unlock(self) {}
}

impl Drop for TextureLock<'_> {
    fn drop(&mut self) {
        self.texture.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rgba8() {
        let texture = Texture::rgba8(4, 3).unwrap();
        assert_eq!(texture.extent(), Extent::new(4, 3));
        assert_eq!(texture.pixels().len(), 12);
        assert_eq!(texture.as_bytes().len(), 48);
        assert_eq!(texture.pixel(3, 2).unwrap(), Rgba8::BLACK);
    }

    #[test]
    fn test_unsupported_textures() {
        let err = Texture::new(TextureType::Tex3D, Extent::new(4, 4), ColorFormat::R8G8B8A8)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedTexture { .. }));

        let err = Texture::new(
            TextureType::Tex2D,
            Extent::new(4, 4),
            ColorFormat::R32G32B32A32Float,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedTexture { .. }));

        assert_eq!(
            Texture::rgba8(0, 4).unwrap_err(),
            RenderError::EmptyExtent {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn test_lock_bumps_revision() {
        let mut texture = Texture::rgba8(2, 2).unwrap();
        assert_eq!(texture.revision(), 0);

        let mut lock = texture.lock();
        lock.put(1, 0, Rgba8::new(10, 20, 30, 255));
        lock.unlock();
        assert_eq!(texture.revision(), 1);

        {
            let _lock = texture.lock();
        }
        assert_eq!(texture.revision(), 2);
        assert_eq!(texture.pixel(1, 0).unwrap(), Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let texture = Texture::rgba8(2, 2).unwrap();
        assert!(matches!(
            texture.pixel(2, 0),
            Err(RenderError::PixelOutOfBounds { x: 2, y: 0, .. })
        ));
    }

    #[test]
    fn test_color_conversion_clamps() {
        let c = Rgba8::from_color(Vec4::new(2.0, -1.0, 0.5, 1.0));
        assert_eq!(c, Rgba8::new(255, 0, 127, 255));
        assert_eq!(Rgba8::from_color(Vec4::new(0.0, 0.0, 0.0, 1.0)), Rgba8::BLACK);
    }

    #[test]
    fn test_fill_and_image() {
        let mut texture = Texture::rgba8(3, 2).unwrap();
        texture.fill(Rgba8::new(1, 2, 3, 4));

        let image = texture.to_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [1, 2, 3, 4]);
        assert_eq!(&texture.as_bytes()[..4], &[1, 2, 3, 4]);
    }
}
