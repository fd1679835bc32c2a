/// Colour modulation and the single directional light.
/// Kept separate from the rasterizer so the lighting model
/// can evolve independently of scan conversion.
use crate::geometry::Triangle;
use glam::Vec3;

/// Scale the RGB channels of a packed ARGB colour by `intensity`.
///
/// Channels are rounded to nearest and clamped to [0, 255]; alpha is forced
/// opaque. Intensities above 1.0 saturate instead of spilling into the
/// neighbouring channel.
#[inline]
pub fn apply_intensity(color: u32, intensity: f32) -> u32 {
    let a = 0xFFu32;
    let r = scale_channel((color >> 16) & 0xFF, intensity);
    let g = scale_channel((color >> 8) & 0xFF, intensity);
    let b = scale_channel(color & 0xFF, intensity);
    (a << 24) | (r << 16) | (g << 8) | b
}

#[inline(always)]
fn scale_channel(channel: u32, intensity: f32) -> u32 {
    let scaled = channel as f32 * intensity + 0.5;
    if scaled >= 256.0 {
        crate::count_call!(crate::perf::FUNCTION_COUNTERS.color_saturations);
        255
    } else if scaled > 0.0 {
        scaled as u32
    } else {
        // Also catches NaN.
        0
    }
}

/// Directional light with Lambertian response.
#[derive(Copy, Clone, Debug)]
pub struct DirectionalLight {
    /// Direction the light travels, normalized.
    pub direction: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            // Straight down.
            direction: Vec3::NEG_Y,
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            intensity,
        }
    }

    /// Intensity for a surface with normal `n`, mapped from [-1, 1] to [0, 1].
    #[inline]
    pub fn intensity_for(&self, n: Vec3) -> f32 {
        let lambert = -n.dot(self.direction);
        (((lambert + 1.0) * 0.5) * self.intensity).clamp(0.0, 1.0)
    }

    /// Fill `flat_value` from the face normal and each vertex `gouraud` from
    /// its normal. Normals and light direction must share a space.
    pub fn light_triangle(&self, triangle: &mut Triangle) {
        triangle.flat_value = self.intensity_for(triangle.face_normal);
        for vertex in &mut triangle.vertices {
            vertex.gouraud = self.intensity_for(vertex.normal);
        }
    }
}
