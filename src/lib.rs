pub mod clipping;
pub mod config;
pub mod error;
pub mod geometry;
pub mod perf;
/// softraster - CPU-only 3D rendering pipeline
/// Homogeneous clipping, edge-function rasterization and z-buffering
pub mod rendering;
pub mod scene;

pub use clipping::{ClipPlane, Clipper, MAX_TRIANGLES_PER_INPUT};
pub use config::{GouraudInterpolation, RenderConfig, RenderMode, ShadingMode, Threading, DEFAULT_MAX_TRIANGLES};
pub use error::{RenderError, Result, Stage};
pub use geometry::{colors, orient2d, Line3D, Triangle, Vertex};
pub use perf::{CounterSnapshot, FunctionCounters, PerfStats, FUNCTION_COUNTERS};
pub use rendering::{
    apply_intensity, barycentric, perspective_correct_uv, perspective_weights, render_into, render_tiled, Coverage,
    DepthTest, DirectionalLight, FrameStats, FrameTile, Framebuffer, PixelTarget, Rasterizer, Renderer, Texture,
    Viewport, DEPTH_CLEAR,
};
pub use scene::{cube, Camera, Gizmo, Light, Mesh, World, FACE_NORMAL_LENGTH};
