//! Tile partitioning for the multi-context tracer.
//!
//! Divides the viewport into tiles that can be rendered independently,
//! and carves matching disjoint row slices out of a locked pixel buffer.

use lumo_math::Rect;

use crate::error::{RenderError, RenderResult};
use crate::target::Rgba8;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// A rectangular region of the viewport to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner (target pixels)
    pub x: u32,
    /// Y coordinate of the tile's top-left corner (target pixels)
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position of this tile in dispatch order
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// A single tile covering `rect`.
    pub fn covering(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height, 0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn pixel_count(&self) -> u64 {
        self.rect().area()
    }
}

/// Split `area` into a grid of tiles, sorted centre-out.
///
/// Edge tiles are clipped to the area, so the tiles cover every pixel of
/// `area` exactly once.
pub fn generate_tiles(area: Rect, tile_size: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    if tile_size == 0 || area.is_empty() {
        return tiles;
    }

    let mut y = 0;
    while y < area.height {
        let mut x = 0;
        while x < area.width {
            let tw = tile_size.min(area.width - x);
            let th = tile_size.min(area.height - y);
            tiles.push(Tile::new(area.x + x, area.y + y, tw, th, tiles.len()));
            x += tile_size;
        }
        y += tile_size;
    }

    sort_spiral(&mut tiles, area);

    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }

    tiles
}

/// Sort tiles by distance of their centre from the centre of `area`.
fn sort_spiral(tiles: &mut [Tile], area: Rect) {
    let center_x = area.x as f32 + area.width as f32 / 2.0;
    let center_y = area.y as f32 + area.height as f32 / 2.0;

    let distance = |t: &Tile| {
        let cx = t.x as f32 + t.width as f32 / 2.0;
        let cy = t.y as f32 + t.height as f32 / 2.0;
        (cx - center_x).powi(2) + (cy - center_y).powi(2)
    };

    // Stable sort keeps row-major order between equidistant tiles
    tiles.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Exclusive view of one tile's pixels inside a larger buffer.
#[derive(Debug)]
pub struct TileView<'a> {
    tile: Tile,
    rows: Vec<&'a mut [Rgba8]>,
}

impl<'a> TileView<'a> {
    pub fn tile(&self) -> Tile {
        self.tile
    }

    /// One slice per tile row, top to bottom, each `tile.width` long.
    pub fn rows_mut(&mut self) -> &mut [&'a mut [Rgba8]] {
        &mut self.rows
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Rgba8]> {
        self.rows.iter().map(|row| &**row)
    }

    /// Write a pixel at tile-local coordinates.
    pub fn put(&mut self, local_x: u32, local_y: u32, color: Rgba8) {
        debug_assert!(local_x < self.tile.width && local_y < self.tile.height);
        self.rows[local_y as usize][local_x as usize] = color;
    }
}

/// Carve one [`TileView`] per tile out of a row-major `width x height` buffer.
///
/// Tiles must lie inside the buffer and must not overlap. Views are returned
/// in the same order as `tiles`.
pub fn split_tiles<'a>(
    pixels: &'a mut [Rgba8],
    width: u32,
    height: u32,
    tiles: &[Tile],
) -> RenderResult<Vec<TileView<'a>>> {
    let frame = Rect::from_size(width, height);
    debug_assert_eq!(pixels.len(), frame.area() as usize);

    for tile in tiles {
        let rect = tile.rect();
        if rect.is_empty() || !frame.contains_rect(&rect) {
            return Err(RenderError::RegionOutOfBounds {
                region: rect,
                width,
                height,
            });
        }
    }

    if tiles.is_empty() {
        return Ok(Vec::new());
    }

    let mut views: Vec<TileView<'a>> = tiles
        .iter()
        .map(|&tile| TileView {
            tile,
            rows: Vec::with_capacity(tile.height as usize),
        })
        .collect();

    let mut active: Vec<usize> = Vec::with_capacity(tiles.len());
    for (y, row) in pixels.chunks_mut(width as usize).enumerate() {
        let y = y as u32;

        active.clear();
        active.extend((0..tiles.len()).filter(|&i| {
            let t = &tiles[i];
            y >= t.y && y < t.y + t.height
        }));
        active.sort_by_key(|&i| tiles[i].x);

        let mut rest: &'a mut [Rgba8] = row;
        let mut cursor = 0u32;
        let mut previous: Option<usize> = None;
        for &i in &active {
            let tile = &tiles[i];
            if tile.x < cursor {
                let first = previous.map_or(tile.rect(), |p| tiles[p].rect());
                return Err(RenderError::OverlappingTiles {
                    first,
                    second: tile.rect(),
                });
            }

            let (_, tail) = std::mem::take(&mut rest).split_at_mut((tile.x - cursor) as usize);
            let (segment, tail) = tail.split_at_mut(tile.width as usize);
            views[i].rows.push(segment);

            rest = tail;
            cursor = tile.x + tile.width;
            previous = Some(i);
        }
    }

    Ok(views)
}
