/// Geometry records that flow through the pipeline.
/// Every stage copies these by value and produces a fresh list,
/// so no stage aliases another stage's output.
use crate::rendering::texture::Texture;
use glam::{Vec2, Vec3, Vec4};
use std::sync::Arc;

/// Packed ARGB colour constants.
pub mod colors {
    pub const WHITE: u32 = 0xFFFFFFFF;
    pub const BLACK: u32 = 0xFF000000;
    pub const RED: u32 = 0xFFFF0000;
    pub const GREEN: u32 = 0xFF00FF00;
    pub const BLUE: u32 = 0xFF0000FF;
    pub const CYAN: u32 = 0xFF00FFFF;
    pub const MAGENTA: u32 = 0xFFFF00FF;
    pub const YELLOW: u32 = 0xFFFFFF00;
}

/// A single triangle corner.
///
/// `position` holds clip-space `(x, y, z, w)` until the viewport mapper runs;
/// afterwards it holds screen `x, y`, normalized depth in `z`, and `1/w` in `w`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    pub uv: Vec2,
    /// Camera-space normal.
    pub normal: Vec3,
    /// Precomputed light intensity in [0, 1].
    pub gouraud: f32,
}

impl Vertex {
    pub fn new(position: Vec4, uv: Vec2) -> Self {
        Self {
            position,
            uv,
            normal: Vec3::ZERO,
            gouraud: 1.0,
        }
    }

    #[inline]
    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }

    #[inline]
    pub fn with_gouraud(mut self, gouraud: f32) -> Self {
        self.gouraud = gouraud;
        self
    }

    /// Linear blend of every interpolated attribute at parameter `t`.
    /// Affine in homogeneous coordinates, so no division by `w` is needed.
    #[inline]
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        Vertex {
            position: self.position.lerp(other.position, t),
            uv: self.uv.lerp(other.uv, t),
            normal: self.normal.lerp(other.normal, t),
            gouraud: self.gouraud + (other.gouraud - self.gouraud) * t,
        }
    }

    /// Screen-space (x, y) of a projected vertex.
    #[inline(always)]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.y)
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new(Vec4::ZERO, Vec2::ZERO)
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub face_normal: Vec3,
    /// Cached `orient2d` of the projected positions. Positive means front facing.
    pub signed_area: f32,
    /// Packed ARGB used by the non-textured modes.
    pub color: u32,
    /// Flat-shading intensity for the whole face.
    pub flat_value: f32,
    pub texture: Option<Arc<Texture>>,
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3]) -> Self {
        Self {
            vertices,
            face_normal: Vec3::ZERO,
            signed_area: 0.0,
            color: colors::WHITE,
            flat_value: 1.0,
            texture: None,
        }
    }

    /// Build from bare clip-space positions with zeroed UVs.
    pub fn from_positions(p0: Vec4, p1: Vec4, p2: Vec4) -> Self {
        Self::new([
            Vertex::new(p0, Vec2::ZERO),
            Vertex::new(p1, Vec2::ZERO),
            Vertex::new(p2, Vec2::ZERO),
        ])
    }

    #[inline]
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    #[inline]
    pub fn with_flat_value(mut self, flat_value: f32) -> Self {
        self.flat_value = flat_value;
        self
    }

    /// Same triangle carrying different corners; shared attributes are kept.
    #[inline]
    pub fn with_vertices(&self, vertices: [Vertex; 3]) -> Self {
        Self {
            vertices,
            face_normal: self.face_normal,
            signed_area: self.signed_area,
            color: self.color,
            flat_value: self.flat_value,
            texture: self.texture.clone(),
        }
    }

    /// Recompute and cache the 2D edge function of the (x, y) positions.
    #[inline]
    pub fn update_signed_area(&mut self) -> f32 {
        self.signed_area = orient2d(
            self.vertices[0].xy(),
            self.vertices[1].xy(),
            self.vertices[2].xy(),
        );
        self.signed_area
    }

    /// Counter-clockwise in a y-up screen space is front facing.
    #[inline]
    pub fn is_front_facing(&self) -> bool {
        orient2d(
            self.vertices[0].xy(),
            self.vertices[1].xy(),
            self.vertices[2].xy(),
        ) > 0.0
    }

    /// Unit normal of the plane through the first three positions (xyz only).
    pub fn compute_face_normal(&self) -> Vec3 {
        let a = self.vertices[0].position.truncate();
        let b = self.vertices[1].position.truncate();
        let c = self.vertices[2].position.truncate();
        (b - a).cross(c - a).normalize_or_zero()
    }
}

/// Line segment used by debug overlays (axis gizmo, light direction).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line3D {
    pub points: [Vec4; 2],
    pub color: u32,
    /// Cleared by the clipper when the segment lies fully outside the frustum.
    pub visible: bool,
}

impl Line3D {
    pub fn new(start: Vec4, end: Vec4, color: u32) -> Self {
        Self {
            points: [start, end],
            color,
            visible: true,
        }
    }
}

/// Twice the signed area of triangle (a, b, c).
/// Positive when a -> b -> c winds counter-clockwise with y pointing up.
#[inline(always)]
pub fn orient2d(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orient2d_sign_follows_winding() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        let c = Vec2::new(0.0, 4.0);
        assert_eq!(orient2d(a, b, c), 16.0);
        assert_eq!(orient2d(a, c, b), -16.0);
        assert_eq!(orient2d(a, b, Vec2::new(8.0, 0.0)), 0.0);
    }

    #[test]
    fn vertex_lerp_blends_all_attributes() {
        let a = Vertex::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec2::new(0.0, 0.0))
            .with_gouraud(0.0)
            .with_normal(Vec3::X);
        let b = Vertex::new(Vec4::new(2.0, 4.0, 6.0, 3.0), Vec2::new(1.0, 0.5))
            .with_gouraud(1.0)
            .with_normal(Vec3::Y);

        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.position, Vec4::new(1.0, 2.0, 3.0, 2.0));
        assert_eq!(mid.uv, Vec2::new(0.5, 0.25));
        assert_eq!(mid.gouraud, 0.5);
        assert_eq!(mid.normal, Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn face_normal_of_ccw_xy_triangle_points_along_z() {
        let tri = Triangle::from_positions(
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
        );
        assert_eq!(tri.compute_face_normal(), Vec3::Z);
    }
}
