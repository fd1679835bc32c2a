/// Headless demo: renders a spinning textured cube into an off-screen
/// framebuffer and reports per-stage timings
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec3;
use log::info;
use mimalloc::MiMalloc;
use softraster::*;
use std::sync::Arc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    Vertices,
    Wireframe,
    WireframeVertices,
    Solid,
    SolidWireframe,
    Textured,
    TexturedWireframe,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Vertices => RenderMode::VerticesOnly,
            ModeArg::Wireframe => RenderMode::Wireframe,
            ModeArg::WireframeVertices => RenderMode::WireframeVertices,
            ModeArg::Solid => RenderMode::Solid,
            ModeArg::SolidWireframe => RenderMode::SolidWireframe,
            ModeArg::Textured => RenderMode::Textured,
            ModeArg::TexturedWireframe => RenderMode::TexturedWireframe,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ShadingArg {
    None,
    Flat,
    Gouraud,
}

impl From<ShadingArg> for ShadingMode {
    fn from(shading: ShadingArg) -> Self {
        match shading {
            ShadingArg::None => ShadingMode::None,
            ShadingArg::Flat => ShadingMode::Flat,
            ShadingArg::Gouraud => ShadingMode::Gouraud,
        }
    }
}

/// softraster - CPU software rasterizer demo
#[derive(Parser, Debug)]
#[command(name = "softraster", version, about = "Headless software rasterizer benchmark")]
struct Args {
    /// Number of frames to render
    #[arg(short, long, default_value_t = 120)]
    frames: usize,

    #[arg(long, default_value_t = 800)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    #[arg(short, long, value_enum, default_value_t = ModeArg::Textured)]
    mode: ModeArg,

    #[arg(short, long, value_enum, default_value_t = ShadingArg::Flat)]
    shading: ShadingArg,

    /// Interpolate gouraud intensities in screen space instead of 1/w space
    #[arg(long)]
    affine_gouraud: bool,

    /// Tile edge for parallel rasterization (0 = single thread)
    #[arg(short, long, default_value_t = 0)]
    tile: usize,

    /// Draw back faces too
    #[arg(long)]
    no_culling: bool,

    /// Skip the axis gizmo and light direction lines
    #[arg(long)]
    no_lines: bool,

    /// Draw a short line along every face normal
    #[arg(long)]
    normals: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            render_mode: self.mode.into(),
            shading_mode: self.shading.into(),
            gouraud_interpolation: if self.affine_gouraud {
                GouraudInterpolation::Affine
            } else {
                GouraudInterpolation::PerspectiveCorrect
            },
            backface_culling: !self.no_culling,
            threading: if self.tile == 0 {
                Threading::Single
            } else {
                Threading::Tiled {
                    tile_width: self.tile,
                    tile_height: self.tile,
                }
            },
            draw_lines: !self.no_lines,
            show_face_normals: self.normals,
            ..RenderConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("=== softraster - CPU rasterizer ===");

    let config = args.render_config();
    info!(
        "{}x{}, {:?}, {:?} shading, {:?}",
        args.width, args.height, config.render_mode, config.shading_mode, config.threading
    );

    let mut renderer = Renderer::new(config, args.width, args.height).context("creating renderer")?;
    let mut framebuffer = Framebuffer::new(args.width, args.height);

    let texture = Texture::checkerboard(64, 64, 8, colors::WHITE, 0xFF808080).context("building texture")?;

    let aspect_ratio = args.width as f32 / args.height as f32;
    let mut camera = Camera::new(Vec3::new(0.0, 3.0, 6.0), aspect_ratio);
    camera.look_at(Vec3::ZERO);

    let mut world = World::new(camera);
    world.light.directional = DirectionalLight::new(Vec3::new(-0.4, -1.0, -0.3), 1.0);
    world.add_mesh(cube(Some(Arc::new(texture))));

    let mut totals = PerfStats::new();
    let mut pixels = 0usize;

    for frame in 0..args.frames {
        for mesh in &mut world.meshes {
            mesh.rotate_y(0.02);
        }

        let (triangles, lines) = world.build_frame(renderer.config());
        let stats = renderer
            .render_frame(&mut framebuffer, triangles, lines)
            .with_context(|| format!("rendering frame {}", frame))?;

        totals.accumulate(&stats.perf);
        pixels += stats.pixels_written;
    }

    if args.frames > 0 {
        let frames = args.frames as f64;
        info!(
            "{} frames, {:.2}ms/frame avg, {} pixel writes/frame avg",
            args.frames,
            totals.total_us / frames / 1000.0,
            pixels / args.frames
        );
        totals.log_summary();
    }

    #[cfg(feature = "profiling")]
    FUNCTION_COUNTERS.snapshot().log_report();

    // Simple order-dependent checksum so runs can be compared.
    let checksum = framebuffer
        .color_buffer_slice()
        .iter()
        .fold(0u64, |acc, &c| acc.rotate_left(5) ^ c as u64);
    info!("final frame checksum: {:016x}", checksum);

    Ok(())
}
