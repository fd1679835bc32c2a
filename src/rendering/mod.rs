pub mod framebuffer;
/// Software rasterization pipeline
/// Clip-space triangles in, shaded and depth-tested pixels out
pub mod rasterizer;
pub mod shading;
pub mod texture;
pub mod viewport;

// Frame driver and parallel tiles
pub mod pipeline;
pub mod tiles;

pub use framebuffer::{DepthTest, FrameTile, Framebuffer, DEPTH_CLEAR};
pub use pipeline::{FrameStats, Renderer};
pub use rasterizer::{barycentric, perspective_correct_uv, perspective_weights, Coverage, PixelTarget, Rasterizer};
pub use shading::{apply_intensity, DirectionalLight};
pub use texture::Texture;
pub use tiles::{render_into, render_tiled};
pub use viewport::{Viewport, NEAR_W_EPSILON};
