/// Render configuration passed explicitly into every draw.
/// Nothing in the pipeline reads mode state from globals.
use crate::geometry::colors;

/// Upper bound on triangles per frame, for both scene input and clip output.
pub const DEFAULT_MAX_TRIANGLES: usize = 100_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum RenderMode {
    VerticesOnly,
    Wireframe,
    WireframeVertices,
    Solid,
    SolidWireframe,
    #[default]
    Textured,
    TexturedWireframe,
}

impl RenderMode {
    pub const ALL: [RenderMode; 7] = [
        RenderMode::VerticesOnly,
        RenderMode::Wireframe,
        RenderMode::WireframeVertices,
        RenderMode::Solid,
        RenderMode::SolidWireframe,
        RenderMode::Textured,
        RenderMode::TexturedWireframe,
    ];

    /// True for modes that fill triangle interiors.
    #[inline]
    pub fn fills(self) -> bool {
        matches!(
            self,
            RenderMode::Solid
                | RenderMode::SolidWireframe
                | RenderMode::Textured
                | RenderMode::TexturedWireframe
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ShadingMode {
    /// Write the triangle colour (or texel) unchanged.
    None,
    /// Scale by the per-face `flat_value`.
    #[default]
    Flat,
    /// Interpolate per-vertex `gouraud` intensities.
    Gouraud,
}

/// How per-vertex gouraud intensities are interpolated across a face.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum GouraudInterpolation {
    /// Plain screen-space barycentric blend.
    Affine,
    /// 1/w-weighted blend, the same path used for UVs.
    #[default]
    PerspectiveCorrect,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Threading {
    #[default]
    Single,
    /// Screen split into disjoint tiles, one worker per tile.
    Tiled { tile_width: usize, tile_height: usize },
}

#[derive(Copy, Clone, Debug)]
pub struct RenderConfig {
    pub render_mode: RenderMode,
    pub shading_mode: ShadingMode,
    pub gouraud_interpolation: GouraudInterpolation,
    pub backface_culling: bool,
    pub clear_color: u32,
    pub wireframe_color: u32,
    pub vertex_color: u32,
    /// Edge length in pixels of the square vertex markers.
    pub vertex_size: i32,
    /// Fill used by the textured modes when a triangle has no texture.
    pub missing_texture_color: u32,
    pub max_triangles: usize,
    pub threading: Threading,
    pub draw_lines: bool,
    /// Emit a short line along each face normal into the debug line list.
    pub show_face_normals: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            shading_mode: ShadingMode::default(),
            gouraud_interpolation: GouraudInterpolation::default(),
            backface_culling: true,
            clear_color: colors::BLUE,
            wireframe_color: colors::GREEN,
            vertex_color: colors::YELLOW,
            vertex_size: 4,
            missing_texture_color: colors::RED,
            max_triangles: DEFAULT_MAX_TRIANGLES,
            threading: Threading::default(),
            draw_lines: true,
            show_face_normals: false,
        }
    }
}

impl RenderConfig {
    /// Colour of face normal lines: green over filled faces, white otherwise.
    #[inline]
    pub fn face_normal_color(&self) -> u32 {
        if self.render_mode.fills() {
            colors::GREEN
        } else {
            colors::WHITE
        }
    }

    /// Colour of wireframe edges drawn on top of a filled face.
    #[inline]
    pub fn overlay_color(&self) -> u32 {
        match self.render_mode {
            RenderMode::SolidWireframe | RenderMode::TexturedWireframe => colors::BLACK,
            _ => self.wireframe_color,
        }
    }
}
