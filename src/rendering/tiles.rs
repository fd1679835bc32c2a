/// Screen-tile parallel rasterization
///
/// The framebuffer is split into disjoint rectangles and each worker owns one.
/// Every worker walks the complete triangle list, then the line list, in
/// submission order and only touches pixels inside its rectangle. Each pixel
/// therefore sees exactly the same sequence of depth tests and writes as in a
/// single-threaded pass, and the result is bit-identical.
use super::framebuffer::Framebuffer;
use super::rasterizer::{Coverage, PixelTarget, Rasterizer};
use crate::config::RenderConfig;
use crate::geometry::{Line3D, Triangle};
use rayon::prelude::*;

/// Render already projected triangles and lines into one target.
/// Returns the number of pixel writes.
pub fn render_into<T: PixelTarget>(
    target: &mut T,
    rasterizer: &Rasterizer,
    triangles: &[Triangle],
    lines: &[Line3D],
    config: &RenderConfig,
) -> usize {
    let mut written = 0usize;

    for tri in triangles {
        if let Coverage::Drawn(pixels) = rasterizer.rasterize(target, tri, config) {
            written += pixels;
        }
    }

    for line in lines.iter().filter(|l| l.visible) {
        written += rasterizer.draw_line_bresenham_3d(
            target,
            line.points[0].truncate(),
            line.points[1].truncate(),
            line.color,
        );
    }

    written
}

/// Parallel counterpart of [`render_into`] over `tile_width x tile_height` tiles.
pub fn render_tiled(
    framebuffer: &mut Framebuffer,
    rasterizer: &Rasterizer,
    triangles: &[Triangle],
    lines: &[Line3D],
    config: &RenderConfig,
    tile_width: usize,
    tile_height: usize,
) -> usize {
    let mut tiles = framebuffer.split_into_tiles(tile_width, tile_height);
    log::debug!(
        "tiled raster: {} tiles of {}x{}, {} triangles",
        tiles.len(),
        tile_width,
        tile_height,
        triangles.len()
    );

    tiles
        .par_iter_mut()
        .map(|tile| render_into(tile, rasterizer, triangles, lines, config))
        .sum()
}
