/// Read-only textures supplied by the asset stage.
/// Rows are stored top row first; texel (x, y) addresses y upward from the bottom.
use crate::error::{RenderError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    // ARGB32
    pixels: Vec<u32>,
}

impl Texture {
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(RenderError::InvalidTexture {
                width,
                height,
                pixels: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Two-colour checkerboard with `cell`-pixel squares.
    pub fn checkerboard(width: usize, height: usize, cell: usize, c1: u32, c2: u32) -> Result<Self> {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for x in 0..width {
                let y = height - 1 - row;
                pixels.push(if ((x / cell) + (y / cell)) % 2 == 0 { c1 } else { c2 });
            }
        }
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Texel at integer coordinates, y measured from the bottom row.
    #[inline(always)]
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        self.pixels[self.width * (self.height - y - 1) + x]
    }

    /// Sample at normalized (u, v). Coordinates wrap, so the texture tiles.
    #[inline(always)]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let tex_x = ((u * self.width as f32) as i64).unsigned_abs() as usize % self.width;
        let tex_y = ((v * self.height as f32) as i64).unsigned_abs() as usize % self.height;
        self.texel(tex_x, tex_y)
    }
}
