/// Per-frame driver: clip -> clear -> project -> rasterize.
use super::framebuffer::Framebuffer;
use super::rasterizer::Rasterizer;
use super::tiles::{render_into, render_tiled};
use super::viewport::Viewport;
use crate::clipping::Clipper;
use crate::config::{RenderConfig, Threading};
use crate::error::{RenderError, Result, Stage};
use crate::geometry::{Line3D, Triangle};
use crate::perf::{PerfStats, PerfTimer};

/// Outcome of one `render_frame` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub input_triangles: usize,
    /// Triangles that survived clipping, after splitting.
    pub clipped_triangles: usize,
    pub visible_lines: usize,
    pub pixels_written: usize,
    pub perf: PerfStats,
}

/// Owns the scratch buffers reused from frame to frame.
pub struct Renderer {
    config: RenderConfig,
    viewport: Viewport,
    clipper: Clipper,
    rasterizer: Rasterizer,
    clipped: Vec<Triangle>,
    lines: Vec<Line3D>,
}

impl Renderer {
    pub fn new(config: RenderConfig, width: usize, height: usize) -> Result<Self> {
        let viewport = Viewport::new(width, height)?;
        Ok(Self {
            clipper: Clipper::new(config.max_triangles),
            config,
            viewport,
            rasterizer: Rasterizer::new(),
            clipped: Vec::new(),
            lines: Vec::new(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.viewport = Viewport::new(width, height)?;
        Ok(())
    }

    /// Triangles left after the last successful clip, in screen space.
    pub fn clipped_triangles(&self) -> &[Triangle] {
        &self.clipped
    }

    /// Render one frame of clip-space `triangles` and debug `lines`.
    ///
    /// A frame that would exceed `max_triangles` at input or after clipping
    /// is rejected before anything is cleared or drawn.
    pub fn render_frame(
        &mut self,
        framebuffer: &mut Framebuffer,
        triangles: &[Triangle],
        lines: &[Line3D],
    ) -> Result<FrameStats> {
        let frame_timer = PerfTimer::new("frame");
        let mut perf = PerfStats::new();

        if framebuffer.width != self.viewport.width || framebuffer.height != self.viewport.height {
            return Err(RenderError::InvalidViewport {
                width: framebuffer.width,
                height: framebuffer.height,
            });
        }

        let limit = self.config.max_triangles;
        if triangles.len() > limit {
            log::warn!("frame rejected: {} input triangles, limit {}", triangles.len(), limit);
            return Err(RenderError::CapacityExceeded {
                stage: Stage::SceneInput,
                limit,
                requested: triangles.len(),
            });
        }

        // --- CLIP ---
        let timer = PerfTimer::new("clipping");
        self.clipper.set_max_triangles(limit);
        if let Err(err) = self.clipper.clip_triangles(triangles, &mut self.clipped) {
            log::warn!("frame rejected: {}", err);
            self.clipped.clear();
            return Err(err);
        }
        self.lines.clear();
        if self.config.draw_lines {
            for line in lines {
                let mut line = *line;
                if Clipper::clip_line(&mut line) {
                    self.lines.push(line);
                }
            }
        }
        perf.clipping_us = timer.elapsed_us();
        drop(timer);

        // --- CLEAR ---
        let timer = PerfTimer::new("clear");
        framebuffer.clear_framebuffer(self.config.clear_color);
        framebuffer.clear_z_buffer();
        perf.clear_us = timer.elapsed_us();
        drop(timer);

        // --- PROJECT ---
        let timer = PerfTimer::new("projection");
        for tri in &mut self.clipped {
            self.viewport.project_triangle(tri);
        }
        for line in &mut self.lines {
            for point in &mut line.points {
                *point = self.viewport.project_point(*point);
            }
        }
        perf.projection_us = timer.elapsed_us();
        drop(timer);

        // --- RASTERIZE ---
        let timer = PerfTimer::new("rasterization");
        let pixels_written = match self.config.threading {
            Threading::Single => render_into(framebuffer, &self.rasterizer, &self.clipped, &self.lines, &self.config),
            Threading::Tiled {
                tile_width,
                tile_height,
            } => render_tiled(
                framebuffer,
                &self.rasterizer,
                &self.clipped,
                &self.lines,
                &self.config,
                tile_width,
                tile_height,
            ),
        };
        perf.rasterization_us = timer.elapsed_us();
        drop(timer);

        perf.total_us = frame_timer.elapsed_us();

        let stats = FrameStats {
            input_triangles: triangles.len(),
            clipped_triangles: self.clipped.len(),
            visible_lines: self.lines.len(),
            pixels_written,
            perf,
        };
        log::debug!(
            "frame: {} in, {} after clipping, {} lines, {} pixel writes, {:.1}us",
            stats.input_triangles,
            stats.clipped_triangles,
            stats.visible_lines,
            stats.pixels_written,
            perf.total_us
        );

        Ok(stats)
    }
}
