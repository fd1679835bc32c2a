/// Framebuffer for software rendering
/// Stores color and depth information
///
/// Screen coordinates have their origin at the bottom-left corner. Memory is
/// row-major with the top screen row first, which is the layout the
/// presentation stage blits directly.
use crate::count_call;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    _mm256_set1_epi32, _mm256_set1_ps, _mm256_storeu_ps, _mm256_storeu_si256, _mm_set1_epi32,
    _mm_set1_ps, _mm_storeu_ps, _mm_storeu_si128,
};
use std::marker::PhantomData;

/// Depth value meaning "nothing drawn yet". Largest finite float so that
/// depth arithmetic on it never produces NaN.
pub const DEPTH_CLEAR: f32 = f32::MAX;

/// Depth comparison used for a write.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DepthTest {
    /// Triangles: strictly closer wins, ties keep the first writer.
    Less,
    /// Lines: equal depth also passes so edges show over their own faces.
    LessEqual,
}

impl DepthTest {
    #[inline(always)]
    pub fn passes(self, depth: f32, stored: f32) -> bool {
        match self {
            DepthTest::Less => depth < stored,
            DepthTest::LessEqual => depth <= stored,
        }
    }
}

pub struct Framebuffer {
    // Hot data: used for every bounds check and index calculation
    pub width: usize,
    pub height: usize,
    // Separate allocations; the depth buffer is never presented
    pub color_buffer: Vec<u32>, // ARGB format
    pub depth_buffer: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_count = width * height;
        Self {
            width,
            height,
            color_buffer: vec![0; pixel_count],
            depth_buffer: vec![DEPTH_CLEAR; pixel_count],
        }
    }

    /// Clear color and depth buffers
    pub fn clear(&mut self, clear_color: u32) {
        self.clear_framebuffer(clear_color);
        self.clear_z_buffer();
    }

    /// Fill every pixel with `color`.
    pub fn clear_framebuffer(&mut self, color: u32) {
        count_call!(crate::perf::FUNCTION_COUNTERS.framebuffer_clear_calls);
        fill_u32(&mut self.color_buffer, color);
    }

    /// Reset every depth to `DEPTH_CLEAR`.
    pub fn clear_z_buffer(&mut self) {
        count_call!(crate::perf::FUNCTION_COUNTERS.z_buffer_clear_calls);
        fill_f32(&mut self.depth_buffer, DEPTH_CLEAR);
    }

    /// Linear index of screen pixel (x, y); y grows upward.
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        self.width * (self.height - y - 1) + x
    }

    /// Color at screen pixel (x, y).
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.color_buffer[self.index(x, y)]
    }

    /// Depth at screen pixel (x, y).
    #[inline]
    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[self.index(x, y)]
    }

    /// Depth test at screen pixel (x, y); on pass the depth is stored and
    /// the index returned for the colour write.
    #[inline]
    pub fn test_depth_and_get_index(
        &mut self,
        x: usize,
        y: usize,
        depth: f32,
        test: DepthTest,
    ) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = self.index(x, y);
        if test.passes(depth, self.depth_buffer[index]) {
            self.depth_buffer[index] = depth;
            Some(index)
        } else {
            None
        }
    }

    /// Set pixel with a strict less-than depth test
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32) -> bool {
        match self.test_depth_and_get_index(x, y, depth, DepthTest::Less) {
            Some(index) => {
                self.color_buffer[index] = color;
                true
            }
            None => false,
        }
    }

    /// Get color buffer as slice
    pub fn color_buffer_slice(&self) -> &[u32] {
        &self.color_buffer
    }

    /// Greyscale rendering of the depth buffer, for debugging.
    /// Cleared pixels map to white.
    pub fn depth_to_color(&self) -> Vec<u32> {
        self.depth_buffer.iter().map(|&d| depth_to_color(d)).collect()
    }

    /// Split the framebuffer into rectangular tiles for parallel rasterization.
    /// Tiles partition both X and Y in screen coordinates; each owns a disjoint
    /// rectangle of pixels, so they can be rendered concurrently without races.
    pub fn split_into_tiles(&mut self, tile_width: usize, tile_height: usize) -> Vec<FrameTile<'_>> {
        let tile_width = tile_width.max(1);
        let tile_height = tile_height.max(1);

        let width = self.width;
        let height = self.height;

        let color_ptr = self.color_buffer.as_mut_ptr();
        let depth_ptr = self.depth_buffer.as_mut_ptr();

        let mut tiles = Vec::new();

        let mut y0 = 0usize;
        while y0 < height {
            let h = (height - y0).min(tile_height);
            let mut x0 = 0usize;
            while x0 < width {
                let w = (width - x0).min(tile_width);
                tiles.push(FrameTile {
                    fb_width: width,
                    fb_height: height,
                    x0,
                    y0,
                    tile_width: w,
                    tile_height: h,
                    color_ptr,
                    depth_ptr,
                    _borrow: PhantomData,
                });
                x0 += tile_width;
            }
            y0 += tile_height;
        }

        tiles
    }
}

/// View into a rectangular tile of the framebuffer.
/// Holds raw pointers into the backing buffers; the mutable borrow of the
/// framebuffer it came from keeps them valid, and tiles never overlap.
pub struct FrameTile<'a> {
    pub fb_width: usize,
    pub fb_height: usize,
    /// Bottom-left corner in screen coordinates.
    pub x0: usize,
    pub y0: usize,
    pub tile_width: usize,
    pub tile_height: usize,
    color_ptr: *mut u32,
    depth_ptr: *mut f32,
    _borrow: PhantomData<&'a mut Framebuffer>,
}

// Safety: every FrameTile produced by one split_into_tiles call covers a
// disjoint pixel rectangle, and all writes are bounds checked against it.
unsafe impl Send for FrameTile<'_> {}

impl FrameTile<'_> {
    #[inline(always)]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x < self.x0 + self.tile_width && y >= self.y0 && y < self.y0 + self.tile_height
    }

    /// Depth test at screen pixel (x, y). On pass the depth is stored and the
    /// framebuffer index returned.
    #[inline]
    pub fn test_depth_and_get_index(
        &mut self,
        x: usize,
        y: usize,
        depth: f32,
        test: DepthTest,
    ) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let index = self.fb_width * (self.fb_height - y - 1) + x;
        // Safety: (x, y) lies inside this tile, which lies inside the framebuffer.
        let stored = unsafe { &mut *self.depth_ptr.add(index) };
        if test.passes(depth, *stored) {
            *stored = depth;
            Some(index)
        } else {
            None
        }
    }

    /// Write a color at a framebuffer index. Indices of pixels outside this
    /// tile are dropped and `false` is returned.
    #[inline]
    pub fn write_color(&mut self, index: usize, color: u32) -> bool {
        if !self.owns_index(index) {
            return false;
        }
        // Safety: the index maps to a pixel inside this tile.
        unsafe {
            *self.color_ptr.add(index) = color;
        }
        true
    }

    #[inline(always)]
    fn owns_index(&self, index: usize) -> bool {
        if index >= self.fb_width * self.fb_height {
            return false;
        }
        let x = index % self.fb_width;
        let y = self.fb_height - 1 - index / self.fb_width;
        self.contains(x, y)
    }

    /// Index of a contained screen pixel, None outside the tile.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        if self.contains(x, y) {
            Some(self.fb_width * (self.fb_height - y - 1) + x)
        } else {
            None
        }
    }
}

/// Map normalized depth to an opaque grey level. Depths outside [0, 1] clamp.
#[inline]
pub fn depth_to_color(depth: f32) -> u32 {
    let level = (depth.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
    0xFF000000 | (level << 16) | (level << 8) | level
}

fn fill_u32(buffer: &mut [u32], value: u32) {
    #[cfg(target_arch = "x86_64")]
    {
        // Prefer AVX (8 pixels per iteration) when available,
        // otherwise fall back to SSE2 (4 pixels per iteration).
        if std::arch::is_x86_feature_detected!("avx") {
            unsafe {
                return fill_u32_avx(buffer, value);
            }
        }
        if std::arch::is_x86_feature_detected!("sse2") {
            unsafe {
                return fill_u32_sse2(buffer, value);
            }
        }
    }

    // Generic scalar fallback for non-x86_64 or CPUs without SIMD.
    buffer.fill(value);
}

fn fill_f32(buffer: &mut [f32], value: f32) {
    #[cfg(target_arch = "x86_64")]
    {
        if std::arch::is_x86_feature_detected!("avx") {
            unsafe {
                return fill_f32_avx(buffer, value);
            }
        }
        if std::arch::is_x86_feature_detected!("sse2") {
            unsafe {
                return fill_f32_sse2(buffer, value);
            }
        }
    }

    buffer.fill(value);
}

/// 8 lanes per store with 256-bit AVX; scalar tail.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
unsafe fn fill_u32_avx(buffer: &mut [u32], value: u32) {
    let len = buffer.len();
    let mut i = 0usize;
    let lanes = _mm256_set1_epi32(value as i32);
    while i + 8 <= len {
        let ptr = buffer.as_mut_ptr().add(i) as *mut _;
        _mm256_storeu_si256(ptr, lanes);
        i += 8;
    }
    // Tail
    for slot in &mut buffer[i..] {
        *slot = value;
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
unsafe fn fill_f32_avx(buffer: &mut [f32], value: f32) {
    let len = buffer.len();
    let mut i = 0usize;
    let lanes = _mm256_set1_ps(value);
    while i + 8 <= len {
        _mm256_storeu_ps(buffer.as_mut_ptr().add(i), lanes);
        i += 8;
    }
    for slot in &mut buffer[i..] {
        *slot = value;
    }
}

/// 4 lanes per store with SSE2; scalar tail.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn fill_u32_sse2(buffer: &mut [u32], value: u32) {
    let len = buffer.len();
    let mut i = 0usize;
    let lanes = _mm_set1_epi32(value as i32);
    while i + 4 <= len {
        let ptr = buffer.as_mut_ptr().add(i) as *mut _;
        _mm_storeu_si128(ptr, lanes);
        i += 4;
    }
    for slot in &mut buffer[i..] {
        *slot = value;
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn fill_f32_sse2(buffer: &mut [f32], value: f32) {
    let len = buffer.len();
    let mut i = 0usize;
    let lanes = _mm_set1_ps(value);
    while i + 4 <= len {
        _mm_storeu_ps(buffer.as_mut_ptr().add(i), lanes);
        i += 4;
    }
    for slot in &mut buffer[i..] {
        *slot = value;
    }
}
