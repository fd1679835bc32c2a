/// Homogeneous clip-space clipping.
///
/// Triangles are clipped before the perspective divide, one Sutherland-Hodgman
/// pass per plane. Plane tests and edge interpolation are both affine in
/// `(x, y, z, w)`, so no division by `w` happens here.
use crate::config::DEFAULT_MAX_TRIANGLES;
use crate::error::{RenderError, Result, Stage};
use crate::geometry::{Line3D, Triangle, Vertex};
use crate::rendering::viewport::NEAR_W_EPSILON;
use glam::Vec4;

/// A triangle can at most double per plane, and there are seven planes.
pub const MAX_TRIANGLES_PER_INPUT: usize = 1 << ClipPlane::ALL.len();

/// Slack allowed when checking clipped output against the planes.
const CLIP_TOLERANCE: f32 = 1e-3;

/// A triangle clipped against one plane has at most four corners.
const MAX_POLY_VERTS: usize = 4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClipPlane {
    /// `w >= epsilon`. Runs first so later planes can compare against `w`.
    W,
    Right,
    Left,
    Top,
    Bottom,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 7] = [
        ClipPlane::W,
        ClipPlane::Right,
        ClipPlane::Left,
        ClipPlane::Top,
        ClipPlane::Bottom,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Signed distance of `p` from the plane; non-negative means inside.
    #[inline(always)]
    pub fn distance(self, p: Vec4) -> f32 {
        match self {
            ClipPlane::W => p.w - NEAR_W_EPSILON,
            ClipPlane::Right => p.w - p.x,
            ClipPlane::Left => p.w + p.x,
            ClipPlane::Top => p.w - p.y,
            ClipPlane::Bottom => p.w + p.y,
            ClipPlane::Near => p.w + p.z,
            ClipPlane::Far => p.w - p.z,
        }
    }

    /// Inside up to the rounding left by edge interpolation.
    #[inline]
    fn is_inside_approx(self, p: Vec4) -> bool {
        self.distance(p) >= -CLIP_TOLERANCE * p.w.abs().max(1.0)
    }

    /// Points on the boundary count as inside.
    #[inline(always)]
    pub fn is_inside(self, p: Vec4) -> bool {
        self.distance(p) >= 0.0
    }

    /// Parameter `t` along `a -> b` where the segment meets the plane.
    /// Only meaningful when `a` and `b` lie on opposite sides.
    #[inline]
    pub fn intersect_ratio(self, a: Vec4, b: Vec4) -> f32 {
        let da = self.distance(a);
        let db = self.distance(b);
        da / (da - db)
    }
}

/// Owns the ping-pong scratch lists reused across frames.
pub struct Clipper {
    max_triangles: usize,
    front: Vec<Triangle>,
    back: Vec<Triangle>,
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRIANGLES)
    }
}

impl Clipper {
    pub fn new(max_triangles: usize) -> Self {
        Self {
            max_triangles,
            front: Vec::with_capacity(MAX_TRIANGLES_PER_INPUT),
            back: Vec::with_capacity(MAX_TRIANGLES_PER_INPUT),
        }
    }

    pub fn set_max_triangles(&mut self, max_triangles: usize) {
        self.max_triangles = max_triangles;
    }

    /// Clip every input triangle against all seven planes.
    ///
    /// `out` is cleared and refilled with clip-space triangles that satisfy
    /// every plane inequality. Fully outside triangles vanish silently.
    /// Fails without touching the rest of the input once the output would
    /// grow past the configured triangle limit.
    pub fn clip_triangles(&mut self, input: &[Triangle], out: &mut Vec<Triangle>) -> Result<usize> {
        out.clear();

        for (i, triangle) in input.iter().enumerate() {
            crate::count_call!(crate::perf::FUNCTION_COUNTERS.clip_input_triangles);

            let produced = self.clip_one(triangle);
            log::trace!("clip: triangle {} -> {} triangles", i, produced);

            if produced == 0 {
                crate::count_call!(crate::perf::FUNCTION_COUNTERS.clip_rejected_triangles);
                continue;
            }

            let requested = out.len() + produced;
            if requested > self.max_triangles {
                return Err(RenderError::CapacityExceeded {
                    stage: Stage::Clipping,
                    limit: self.max_triangles,
                    requested,
                });
            }

            crate::count_add!(crate::perf::FUNCTION_COUNTERS.clip_output_triangles, produced);
            out.extend(self.front.drain(..));
        }

        Ok(out.len())
    }

    /// Run the seven passes for one triangle; the result is left in `front`.
    fn clip_one(&mut self, triangle: &Triangle) -> usize {
        self.front.clear();
        self.front.push(triangle.clone());

        for plane in ClipPlane::ALL {
            self.back.clear();
            for tri in &self.front {
                Self::clip_triangle_to_plane(tri, plane, &mut self.back);
            }
            std::mem::swap(&mut self.front, &mut self.back);

            debug_assert!(self.front.len() <= MAX_TRIANGLES_PER_INPUT);
            if self.front.is_empty() {
                break;
            }
        }

        debug_assert!(
            self.front
                .iter()
                .flat_map(|t| t.vertices.iter())
                .all(|v| ClipPlane::ALL.iter().all(|p| p.is_inside_approx(v.position))),
            "clipped vertex outside the clip volume"
        );
        self.front.len()
    }

    /// Clip one triangle against one plane, appending 0, 1 or 2 triangles.
    /// Returns how many were appended.
    pub fn clip_triangle_to_plane(triangle: &Triangle, plane: ClipPlane, out: &mut Vec<Triangle>) -> usize {
        let v = &triangle.vertices;
        let inside = [
            plane.is_inside(v[0].position),
            plane.is_inside(v[1].position),
            plane.is_inside(v[2].position),
        ];

        match inside {
            [true, true, true] => {
                out.push(triangle.clone());
                return 1;
            }
            [false, false, false] => return 0,
            _ => {}
        }

        // Sutherland-Hodgman walk starting from the closing edge v2 -> v0.
        let mut poly = [v[0]; MAX_POLY_VERTS];
        let mut len = 0usize;

        let mut prev = v[2];
        let mut prev_inside = inside[2];

        for (&curr, &curr_inside) in v.iter().zip(inside.iter()) {
            if prev_inside != curr_inside {
                poly[len] = Self::intersect(&prev, &curr, plane);
                len += 1;
            }
            if curr_inside {
                poly[len] = curr;
                len += 1;
            }

            prev = curr;
            prev_inside = curr_inside;
        }

        match len {
            3 => {
                out.push(triangle.with_vertices([poly[0], poly[1], poly[2]]));
                1
            }
            4 => {
                crate::count_call!(crate::perf::FUNCTION_COUNTERS.clip_split_triangles);
                out.push(triangle.with_vertices([poly[0], poly[1], poly[2]]));
                out.push(triangle.with_vertices([poly[2], poly[3], poly[0]]));
                2
            }
            // Mixed classification always crosses exactly two edges.
            _ => 0,
        }
    }

    #[inline]
    fn intersect(a: &Vertex, b: &Vertex, plane: ClipPlane) -> Vertex {
        let t = plane.intersect_ratio(a.position, b.position);
        a.lerp(b, t)
    }

    /// Clip a line segment in place. Returns false, and marks the line
    /// invisible, when both endpoints lie outside the same plane.
    pub fn clip_line(line: &mut Line3D) -> bool {
        for plane in ClipPlane::ALL {
            let [p0, p1] = line.points;
            let d0 = plane.distance(p0);
            let d1 = plane.distance(p1);

            match (d0 >= 0.0, d1 >= 0.0) {
                (false, false) => {
                    crate::count_call!(crate::perf::FUNCTION_COUNTERS.clip_rejected_lines);
                    line.visible = false;
                    return false;
                }
                (false, true) => line.points[0] = p0.lerp(p1, d0 / (d0 - d1)),
                (true, false) => line.points[1] = p1.lerp(p0, d1 / (d1 - d0)),
                (true, true) => {}
            }
        }

        line.visible = true;
        true
    }
}
