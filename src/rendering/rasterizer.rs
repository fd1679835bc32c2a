/// Software rasterizer using edge functions over a bounding box
/// Pixel centers are sampled at +0.5; depth is "closer wins"
use super::framebuffer::{DepthTest, FrameTile, Framebuffer};
use super::shading::apply_intensity;
use super::texture::Texture;
use crate::config::{GouraudInterpolation, RenderConfig, RenderMode, ShadingMode};
use crate::count_call;
use crate::geometry::{orient2d, Triangle};
use glam::{Vec2, Vec3};

/// Below this `|signed area|` a projected triangle covers no pixel centers
/// reliably and its `1/area` is unusable.
pub const DEGENERATE_AREA_EPSILON: f32 = 1e-6;

/// Base depth offset for wireframe overlays drawn on top of their own face.
pub const WIREFRAME_DEPTH_BIAS: f32 = 1e-4;

/// Normals closer to edge-on than this get the maximum overlay bias.
const MIN_OVERLAY_NORMAL_Z: f32 = 0.1;

/// Abstraction over a render target that supports depth-tested pixel writes.
pub trait PixelTarget {
    /// Full viewport width.
    fn width(&self) -> usize;
    /// Full viewport height.
    fn height(&self) -> usize;
    /// Rectangle covered by this target in screen coordinates:
    /// (x0, y0, width, height).
    fn rect(&self) -> (usize, usize, usize, usize);
    /// On pass the new depth is stored and the colour index returned.
    fn test_depth_and_get_index(&mut self, x: usize, y: usize, depth: f32, test: DepthTest) -> Option<usize>;
    /// Colour index of a pixel this target owns, without touching depth.
    fn index_of(&self, x: usize, y: usize) -> Option<usize>;
    fn write_color(&mut self, index: usize, color: u32);
}

impl PixelTarget for Framebuffer {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn rect(&self) -> (usize, usize, usize, usize) {
        (0, 0, self.width, self.height)
    }

    #[inline]
    fn test_depth_and_get_index(&mut self, x: usize, y: usize, depth: f32, test: DepthTest) -> Option<usize> {
        Framebuffer::test_depth_and_get_index(self, x, y, depth, test)
    }

    #[inline]
    fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(self.index(x, y))
        } else {
            None
        }
    }

    #[inline]
    fn write_color(&mut self, index: usize, color: u32) {
        self.color_buffer[index] = color;
    }
}

impl PixelTarget for FrameTile<'_> {
    #[inline]
    fn width(&self) -> usize {
        self.fb_width
    }

    #[inline]
    fn height(&self) -> usize {
        self.fb_height
    }

    #[inline]
    fn rect(&self) -> (usize, usize, usize, usize) {
        (self.x0, self.y0, self.tile_width, self.tile_height)
    }

    #[inline]
    fn test_depth_and_get_index(&mut self, x: usize, y: usize, depth: f32, test: DepthTest) -> Option<usize> {
        FrameTile::test_depth_and_get_index(self, x, y, depth, test)
    }

    #[inline]
    fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        FrameTile::index_of(self, x, y)
    }

    #[inline]
    fn write_color(&mut self, index: usize, color: u32) {
        FrameTile::write_color(self, index, color);
    }
}

/// What happened to a triangle handed to the rasterizer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Coverage {
    /// Back facing with culling enabled.
    Culled,
    /// Zero or non-finite projected area.
    Degenerate,
    /// Bounding box misses the target rectangle.
    OffTarget,
    /// Number of pixels written, fills and lines combined.
    Drawn(usize),
}

/// `w(x, y) = a*x + b*y + c`, equal to `orient2d(from, to, (x, y))`.
/// Evaluated directly at every pixel so results do not depend on where a
/// scan starts, which keeps tiles and full-screen passes bit-identical.
#[derive(Copy, Clone, Debug)]
struct EdgeEquation {
    a: f32,
    b: f32,
    c: f32,
}

impl EdgeEquation {
    #[inline]
    fn new(from: Vec2, to: Vec2) -> Self {
        Self {
            a: from.y - to.y,
            b: to.x - from.x,
            c: from.x * to.y - from.y * to.x,
        }
    }

    #[inline(always)]
    fn row(&self, py: f32) -> f32 {
        self.b * py + self.c
    }

    #[inline(always)]
    fn at(&self, row: f32, px: f32) -> f32 {
        self.a * px + row
    }
}

/// Per-triangle setup shared by the solid and textured fills.
struct TriangleSetup {
    edges: [EdgeEquation; 3],
    inv_area: f32,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl TriangleSetup {
    fn new<T: PixelTarget>(target: &T, tri: &Triangle) -> Result<Self, Coverage> {
        let p0 = tri.vertices[0].xy();
        let p1 = tri.vertices[1].xy();
        let p2 = tri.vertices[2].xy();

        let area = orient2d(p0, p1, p2);
        // Written so NaN lands here as well.
        if !(area.abs() >= DEGENERATE_AREA_EPSILON) {
            count_call!(crate::perf::FUNCTION_COUNTERS.triangles_degenerate);
            log::trace!("rasterize: degenerate triangle, area {}", area);
            return Err(Coverage::Degenerate);
        }

        // Compute bounding box in screen space
        let mut min_x = p0.x.min(p1.x).min(p2.x).floor() as i32;
        let mut max_x = p0.x.max(p1.x).max(p2.x).ceil() as i32;
        let mut min_y = p0.y.min(p1.y).min(p2.y).floor() as i32;
        let mut max_y = p0.y.max(p1.y).max(p2.y).ceil() as i32;

        // Clip to full viewport
        min_x = min_x.max(0);
        max_x = max_x.min(target.width() as i32 - 1);
        min_y = min_y.max(0);
        max_y = max_y.min(target.height() as i32 - 1);

        // Intersect with this target's rectangle (tile)
        let (tx0, ty0, tw, th) = target.rect();
        min_x = min_x.max(tx0 as i32);
        max_x = max_x.min((tx0 + tw) as i32 - 1);
        min_y = min_y.max(ty0 as i32);
        max_y = max_y.min((ty0 + th) as i32 - 1);

        if min_x > max_x || min_y > max_y {
            return Err(Coverage::OffTarget);
        }

        let inv_area = 1.0 / area;
        debug_assert!(inv_area.is_finite());

        Ok(Self {
            edges: [
                EdgeEquation::new(p1, p2),
                EdgeEquation::new(p2, p0),
                EdgeEquation::new(p0, p1),
            ],
            inv_area,
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Call `f(x, y, (alpha, beta, gamma))` for every covered pixel center.
    /// Weights are normalized by the signed area, so either winding works.
    #[inline(always)]
    fn for_each_fragment<F: FnMut(usize, usize, Vec3)>(&self, mut f: F) {
        let [e0, e1, e2] = self.edges;
        for y in self.min_y..=self.max_y {
            let py = y as f32 + 0.5;
            let (r0, r1, r2) = (e0.row(py), e1.row(py), e2.row(py));

            for x in self.min_x..=self.max_x {
                let px = x as f32 + 0.5;
                let alpha = e0.at(r0, px) * self.inv_area;
                let beta = e1.at(r1, px) * self.inv_area;
                let gamma = e2.at(r2, px) * self.inv_area;

                if alpha >= 0.0 && beta >= 0.0 && gamma >= 0.0 {
                    count_call!(crate::perf::FUNCTION_COUNTERS.pixels_tested);
                    f(x as usize, y as usize, Vec3::new(alpha, beta, gamma));
                }
            }
        }
    }
}

/// Barycentric weights of `p` in triangle (v0, v1, v2), or None when the
/// triangle is degenerate.
#[inline]
pub fn barycentric(v0: Vec2, v1: Vec2, v2: Vec2, p: Vec2) -> Option<Vec3> {
    let area = orient2d(v0, v1, v2);
    if !(area.abs() >= DEGENERATE_AREA_EPSILON) {
        return None;
    }
    let inv_area = 1.0 / area;
    Some(Vec3::new(
        orient2d(v1, v2, p) * inv_area,
        orient2d(v2, v0, p) * inv_area,
        orient2d(v0, v1, p) * inv_area,
    ))
}

/// Screen-space barycentrics re-weighted by `1/w` and renormalized.
/// None when `1/(A+B+C)` is not finite.
#[inline(always)]
pub fn perspective_weights(bary: Vec3, inv_w: Vec3) -> Option<Vec3> {
    let abc = bary * inv_w;
    let norm = 1.0 / (abc.x + abc.y + abc.z);
    if norm.is_finite() {
        Some(abc * norm)
    } else {
        None
    }
}

/// Perspective-correct UV of a projected triangle at barycentric `bary`.
pub fn perspective_correct_uv(tri: &Triangle, bary: Vec3) -> Option<Vec2> {
    let [v0, v1, v2] = &tri.vertices;
    let inv_w = Vec3::new(v0.position.w, v1.position.w, v2.position.w);
    let w = perspective_weights(bary, inv_w)?;
    Some(v0.uv * w.x + v1.uv * w.y + v2.uv * w.z)
}

#[inline(always)]
fn index_at<T: PixelTarget>(target: &T, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 {
        None
    } else {
        target.index_of(x as usize, y as usize)
    }
}

/// Integer Bresenham walk from (x0, y0) to (x1, y1), endpoints included.
#[inline]
fn bresenham_walk<F: FnMut(i32, i32)>(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: F) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);
    loop {
        plot(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[inline(always)]
fn pixel_of(v: f32) -> i32 {
    v.floor() as i32
}

/// Stateless; every draw takes its configuration explicitly.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rasterizer;

impl Rasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Draw one screen-space triangle according to `config.render_mode`.
    pub fn rasterize<T: PixelTarget>(&self, target: &mut T, tri: &Triangle, config: &RenderConfig) -> Coverage {
        count_call!(crate::perf::FUNCTION_COUNTERS.rasterize_calls);

        if config.backface_culling && !tri.is_front_facing() {
            count_call!(crate::perf::FUNCTION_COUNTERS.triangles_culled);
            return Coverage::Culled;
        }

        let overlay = config.overlay_color();
        match config.render_mode {
            RenderMode::VerticesOnly => {
                Coverage::Drawn(self.draw_vertices(target, tri, config.vertex_color, config.vertex_size))
            }
            RenderMode::Wireframe => Coverage::Drawn(self.draw_wireframe(target, tri, overlay)),
            RenderMode::WireframeVertices => {
                let edges = self.draw_wireframe(target, tri, overlay);
                let markers = self.draw_vertices(target, tri, config.vertex_color, config.vertex_size);
                Coverage::Drawn(edges + markers)
            }
            RenderMode::Solid => self.draw_solid(target, tri, tri.color, config),
            RenderMode::SolidWireframe => {
                let fill = self.draw_solid(target, tri, tri.color, config);
                self.with_overlay(target, tri, overlay, fill)
            }
            RenderMode::Textured => self.draw_textured_or_fallback(target, tri, config),
            RenderMode::TexturedWireframe => {
                let fill = self.draw_textured_or_fallback(target, tri, config);
                self.with_overlay(target, tri, overlay, fill)
            }
        }
    }

    fn with_overlay<T: PixelTarget>(&self, target: &mut T, tri: &Triangle, color: u32, fill: Coverage) -> Coverage {
        match fill {
            Coverage::Drawn(pixels) => Coverage::Drawn(pixels + self.draw_wireframe_no_zfight(target, tri, color)),
            other => other,
        }
    }

    fn draw_textured_or_fallback<T: PixelTarget>(
        &self,
        target: &mut T,
        tri: &Triangle,
        config: &RenderConfig,
    ) -> Coverage {
        match tri.texture.as_deref() {
            Some(texture) => self.draw_textured(target, tri, texture, config),
            None => self.draw_solid(target, tri, config.missing_texture_color, config),
        }
    }

    /// Fill with `color`, shaded per `config.shading_mode`.
    pub fn draw_solid<T: PixelTarget>(
        &self,
        target: &mut T,
        tri: &Triangle,
        color: u32,
        config: &RenderConfig,
    ) -> Coverage {
        let setup = match TriangleSetup::new(target, tri) {
            Ok(setup) => setup,
            Err(coverage) => return coverage,
        };

        let [v0, v1, v2] = &tri.vertices;
        let z = Vec3::new(v0.position.z, v1.position.z, v2.position.z);
        let inv_w = Vec3::new(v0.position.w, v1.position.w, v2.position.w);
        let gouraud = Vec3::new(v0.gouraud, v1.gouraud, v2.gouraud);
        let perspective = config.gouraud_interpolation == GouraudInterpolation::PerspectiveCorrect;

        // Constant colour for the whole face unless shading varies per pixel.
        let constant = match config.shading_mode {
            ShadingMode::None => Some(color),
            ShadingMode::Flat => Some(apply_intensity(color, tri.flat_value)),
            ShadingMode::Gouraud => None,
        };

        let mut drawn = 0usize;
        setup.for_each_fragment(|x, y, bary| {
            let shaded = match constant {
                Some(c) => c,
                None => {
                    let weights = if perspective {
                        match perspective_weights(bary, inv_w) {
                            Some(w) => w,
                            None => {
                                count_call!(crate::perf::FUNCTION_COUNTERS.texel_samples_skipped);
                                return;
                            }
                        }
                    } else {
                        bary
                    };
                    apply_intensity(color, weights.dot(gouraud))
                }
            };

            let depth = bary.dot(z);
            if let Some(idx) = target.test_depth_and_get_index(x, y, depth, DepthTest::Less) {
                target.write_color(idx, shaded);
                count_call!(crate::perf::FUNCTION_COUNTERS.depth_passed);
                drawn += 1;
            } else {
                count_call!(crate::perf::FUNCTION_COUNTERS.depth_failed);
            }
        });

        Coverage::Drawn(drawn)
    }

    /// Perspective-correct textured fill. The texel is modulated the same
    /// way `draw_solid` modulates the face colour.
    pub fn draw_textured<T: PixelTarget>(
        &self,
        target: &mut T,
        tri: &Triangle,
        texture: &Texture,
        config: &RenderConfig,
    ) -> Coverage {
        let setup = match TriangleSetup::new(target, tri) {
            Ok(setup) => setup,
            Err(coverage) => return coverage,
        };

        let [v0, v1, v2] = &tri.vertices;
        let z = Vec3::new(v0.position.z, v1.position.z, v2.position.z);
        let inv_w = Vec3::new(v0.position.w, v1.position.w, v2.position.w);
        let gouraud = Vec3::new(v0.gouraud, v1.gouraud, v2.gouraud);
        let (uv0, uv1, uv2) = (v0.uv, v1.uv, v2.uv);
        let perspective = config.gouraud_interpolation == GouraudInterpolation::PerspectiveCorrect;

        let mut drawn = 0usize;
        setup.for_each_fragment(|x, y, bary| {
            let Some(weights) = perspective_weights(bary, inv_w) else {
                count_call!(crate::perf::FUNCTION_COUNTERS.texel_samples_skipped);
                return;
            };

            let depth = bary.dot(z);
            let Some(idx) = target.test_depth_and_get_index(x, y, depth, DepthTest::Less) else {
                count_call!(crate::perf::FUNCTION_COUNTERS.depth_failed);
                return;
            };

            let uv = uv0 * weights.x + uv1 * weights.y + uv2 * weights.z;
            let texel = texture.sample(uv.x, uv.y);
            let shaded = match config.shading_mode {
                ShadingMode::None => texel,
                ShadingMode::Flat => apply_intensity(texel, tri.flat_value),
                ShadingMode::Gouraud => {
                    let g = if perspective { weights } else { bary };
                    apply_intensity(texel, g.dot(gouraud))
                }
            };

            target.write_color(idx, shaded);
            count_call!(crate::perf::FUNCTION_COUNTERS.depth_passed);
            drawn += 1;
        });

        Coverage::Drawn(drawn)
    }

    /// Triangle outline without depth testing.
    pub fn draw_wireframe<T: PixelTarget>(&self, target: &mut T, tri: &Triangle, color: u32) -> usize {
        let p = tri.vertices.map(|v| v.xy());
        let mut written = 0;
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            written += self.draw_line_bresenham(
                target,
                pixel_of(p[a].x),
                pixel_of(p[a].y),
                pixel_of(p[b].x),
                pixel_of(p[b].y),
                color,
            );
        }
        written
    }

    /// Depth-tested outline.
    pub fn draw_wireframe_3d<T: PixelTarget>(&self, target: &mut T, tri: &Triangle, color: u32) -> usize {
        let p = tri.vertices.map(|v| v.position.truncate());
        let mut written = 0;
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            written += self.draw_line_bresenham_3d(target, p[a], p[b], color);
        }
        written
    }

    /// Depth-tested outline pulled toward the viewer. The offset grows as
    /// the interpolated normal turns edge-on, where depth changes fastest.
    pub fn draw_wireframe_no_zfight<T: PixelTarget>(&self, target: &mut T, tri: &Triangle, color: u32) -> usize {
        let mut written = 0;
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let (va, vb) = (&tri.vertices[a], &tri.vertices[b]);
            let (nza, nzb) = (va.normal.z, vb.normal.z);
            written += Self::depth_line(
                target,
                va.position.truncate(),
                vb.position.truncate(),
                color,
                |t| {
                    let nz = nza + (nzb - nza) * t;
                    WIREFRAME_DEPTH_BIAS / nz.abs().max(MIN_OVERLAY_NORMAL_Z)
                },
            );
        }
        written
    }

    /// Square markers of `size` pixels centred on each vertex.
    pub fn draw_vertices<T: PixelTarget>(&self, target: &mut T, tri: &Triangle, color: u32, size: i32) -> usize {
        let half = size / 2;
        tri.vertices
            .iter()
            .map(|v| {
                let p = v.xy();
                self.draw_rect(target, pixel_of(p.x) - half, pixel_of(p.y) - half, size, size, color)
            })
            .sum()
    }

    /// Axis-aligned filled rectangle, no depth test. (x, y) is its bottom-left pixel.
    pub fn draw_rect<T: PixelTarget>(
        &self,
        target: &mut T,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: u32,
    ) -> usize {
        let mut written = 0;
        for py in y..y.saturating_add(height) {
            for px in x..x.saturating_add(width) {
                if let Some(idx) = index_at(target, px, py) {
                    target.write_color(idx, color);
                    written += 1;
                }
            }
        }
        written
    }

    /// 2D integer line, no depth test.
    pub fn draw_line_bresenham<T: PixelTarget>(
        &self,
        target: &mut T,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: u32,
    ) -> usize {
        let mut written = 0;
        bresenham_walk(x0, y0, x1, y1, |x, y| {
            if let Some(idx) = index_at(target, x, y) {
                target.write_color(idx, color);
                written += 1;
            }
        });
        written
    }

    /// Line between screen points `(x, y, depth)`. Depth follows the
    /// Euclidean distance travelled; equal depths pass.
    pub fn draw_line_bresenham_3d<T: PixelTarget>(&self, target: &mut T, p0: Vec3, p1: Vec3, color: u32) -> usize {
        Self::depth_line(target, p0, p1, color, |_| 0.0)
    }

    fn depth_line<T: PixelTarget, B: Fn(f32) -> f32>(target: &mut T, p0: Vec3, p1: Vec3, color: u32, bias: B) -> usize {
        let (x0, y0) = (pixel_of(p0.x), pixel_of(p0.y));
        let (x1, y1) = (pixel_of(p1.x), pixel_of(p1.y));
        let length = (((x1 - x0) as f32).powi(2) + ((y1 - y0) as f32).powi(2)).sqrt();

        let mut written = 0;
        bresenham_walk(x0, y0, x1, y1, |x, y| {
            if x < 0 || y < 0 {
                return;
            }
            let t = if length > 0.0 {
                (((x - x0) as f32).powi(2) + ((y - y0) as f32).powi(2)).sqrt() / length
            } else {
                0.0
            };
            let depth = p0.z + (p1.z - p0.z) * t - bias(t);
            match target.test_depth_and_get_index(x as usize, y as usize, depth, DepthTest::LessEqual) {
                Some(idx) => {
                    target.write_color(idx, color);
                    written += 1;
                }
                None => {
                    count_call!(crate::perf::FUNCTION_COUNTERS.depth_failed);
                }
            }
        });
        written
    }

    /// Floating-point DDA line, no depth test. Kept as a reference for
    /// comparing against the integer walk.
    pub fn draw_line_dda<T: PixelTarget>(
        &self,
        target: &mut T,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: u32,
    ) -> usize {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let side_length = dx.abs().max(dy.abs());

        let (x_inc, y_inc) = if side_length == 0 {
            (0.0, 0.0)
        } else {
            (dx as f32 / side_length as f32, dy as f32 / side_length as f32)
        };

        let mut current_x = x0 as f32;
        let mut current_y = y0 as f32;
        let mut written = 0;
        for _ in 0..=side_length {
            if let Some(idx) = index_at(target, current_x.round() as i32, current_y.round() as i32) {
                target.write_color(idx, color);
                written += 1;
            }
            current_x += x_inc;
            current_y += y_inc;
        }
        written
    }
}
