/// Perspective divide and NDC -> screen mapping.
/// Applied per vertex, only to triangles that survived clipping.
use crate::error::{RenderError, Result};
use crate::geometry::Triangle;
use glam::{Vec3, Vec4};

/// Guard for the perspective divide; matches the clipper's `w` plane.
pub const NEAR_W_EPSILON: f32 = 1e-5;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// `1/w`, or 1.0 when `w` is too close to zero to divide by.
    #[inline(always)]
    pub fn inverse_w(w: f32) -> f32 {
        if w.abs() < NEAR_W_EPSILON {
            1.0
        } else {
            1.0 / w
        }
    }

    /// Clip space -> normalized device coordinates. Returns NDC and `1/w`.
    #[inline]
    pub fn to_ndc(clip: Vec4) -> (Vec3, f32) {
        let inv_w = Self::inverse_w(clip.w);
        (clip.truncate() * inv_w, inv_w)
    }

    /// NDC -> screen pixels, origin bottom-left, depth remapped to [0, 1].
    #[inline]
    pub fn to_screen(&self, ndc: Vec3) -> Vec3 {
        Vec3::new(
            (ndc.x + 1.0) * self.width as f32 * 0.5,
            (ndc.y + 1.0) * self.height as f32 * 0.5,
            (ndc.z + 1.0) * 0.5,
        )
    }

    /// Screen position of a clip-space point; `w` carries `1/w` afterwards.
    #[inline]
    pub fn project_point(&self, clip: Vec4) -> Vec4 {
        let (ndc, inv_w) = Self::to_ndc(clip);
        self.to_screen(ndc).extend(inv_w)
    }

    /// Project every vertex in place and refresh the cached signed area.
    pub fn project_triangle(&self, triangle: &mut Triangle) {
        for vertex in &mut triangle.vertices {
            vertex.position = self.project_point(vertex.position);
        }
        triangle.update_signed_area();
    }
}
