/// Call counters for the clipping and rasterization hot paths.
/// Compiled to no-ops unless the `profiling` feature is enabled.
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters; safe to bump from tile workers.
pub struct FunctionCounters {
    // Clipping counters
    pub clip_input_triangles: AtomicU64,
    pub clip_output_triangles: AtomicU64,
    pub clip_rejected_triangles: AtomicU64,
    pub clip_split_triangles: AtomicU64,
    pub clip_rejected_lines: AtomicU64,

    // Rasterization counters
    pub rasterize_calls: AtomicU64,
    pub triangles_culled: AtomicU64,
    pub triangles_degenerate: AtomicU64,
    pub pixels_tested: AtomicU64,
    pub depth_passed: AtomicU64,
    pub depth_failed: AtomicU64,
    pub texel_samples_skipped: AtomicU64,
    pub color_saturations: AtomicU64,

    // Framebuffer counters
    pub framebuffer_clear_calls: AtomicU64,
    pub z_buffer_clear_calls: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            clip_input_triangles: AtomicU64::new(0),
            clip_output_triangles: AtomicU64::new(0),
            clip_rejected_triangles: AtomicU64::new(0),
            clip_split_triangles: AtomicU64::new(0),
            clip_rejected_lines: AtomicU64::new(0),
            rasterize_calls: AtomicU64::new(0),
            triangles_culled: AtomicU64::new(0),
            triangles_degenerate: AtomicU64::new(0),
            pixels_tested: AtomicU64::new(0),
            depth_passed: AtomicU64::new(0),
            depth_failed: AtomicU64::new(0),
            texel_samples_skipped: AtomicU64::new(0),
            color_saturations: AtomicU64::new(0),
            framebuffer_clear_calls: AtomicU64::new(0),
            z_buffer_clear_calls: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn all(&self) -> [&AtomicU64; 15] {
        [
            &self.clip_input_triangles,
            &self.clip_output_triangles,
            &self.clip_rejected_triangles,
            &self.clip_split_triangles,
            &self.clip_rejected_lines,
            &self.rasterize_calls,
            &self.triangles_culled,
            &self.triangles_degenerate,
            &self.pixels_tested,
            &self.depth_passed,
            &self.depth_failed,
            &self.texel_samples_skipped,
            &self.color_saturations,
            &self.framebuffer_clear_calls,
            &self.z_buffer_clear_calls,
        ]
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            clip_input_triangles: self.clip_input_triangles.load(Ordering::Relaxed),
            clip_output_triangles: self.clip_output_triangles.load(Ordering::Relaxed),
            clip_rejected_triangles: self.clip_rejected_triangles.load(Ordering::Relaxed),
            clip_split_triangles: self.clip_split_triangles.load(Ordering::Relaxed),
            clip_rejected_lines: self.clip_rejected_lines.load(Ordering::Relaxed),
            rasterize_calls: self.rasterize_calls.load(Ordering::Relaxed),
            triangles_culled: self.triangles_culled.load(Ordering::Relaxed),
            triangles_degenerate: self.triangles_degenerate.load(Ordering::Relaxed),
            pixels_tested: self.pixels_tested.load(Ordering::Relaxed),
            depth_passed: self.depth_passed.load(Ordering::Relaxed),
            depth_failed: self.depth_failed.load(Ordering::Relaxed),
            texel_samples_skipped: self.texel_samples_skipped.load(Ordering::Relaxed),
            color_saturations: self.color_saturations.load(Ordering::Relaxed),
            framebuffer_clear_calls: self.framebuffer_clear_calls.load(Ordering::Relaxed),
            z_buffer_clear_calls: self.z_buffer_clear_calls.load(Ordering::Relaxed),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterSnapshot {
    pub clip_input_triangles: u64,
    pub clip_output_triangles: u64,
    pub clip_rejected_triangles: u64,
    pub clip_split_triangles: u64,
    pub clip_rejected_lines: u64,
    pub rasterize_calls: u64,
    pub triangles_culled: u64,
    pub triangles_degenerate: u64,
    pub pixels_tested: u64,
    pub depth_passed: u64,
    pub depth_failed: u64,
    pub texel_samples_skipped: u64,
    pub color_saturations: u64,
    pub framebuffer_clear_calls: u64,
    pub z_buffer_clear_calls: u64,
}

impl CounterSnapshot {
    /// Log a formatted report at info level.
    pub fn log_report(&self) {
        log::info!("=== Performance Counters Report ===");
        log::info!("Clipping:");
        log::info!("  input triangles:            {:12}", self.clip_input_triangles);
        log::info!("  output triangles:           {:12}", self.clip_output_triangles);
        log::info!("  rejected triangles:         {:12}", self.clip_rejected_triangles);
        log::info!("  split triangles:            {:12}", self.clip_split_triangles);
        log::info!("  rejected lines:             {:12}", self.clip_rejected_lines);

        log::info!("Rasterization:");
        log::info!("  rasterize calls:            {:12}", self.rasterize_calls);
        log::info!("  culled:                     {:12}", self.triangles_culled);
        log::info!("  degenerate:                 {:12}", self.triangles_degenerate);

        log::info!("Pixels:");
        log::info!("  tested:                     {:12}", self.pixels_tested);
        log::info!("  depth test passed:          {:12}", self.depth_passed);
        log::info!("  depth test failed:          {:12}", self.depth_failed);
        if self.pixels_tested > 0 {
            let pass_rate = (self.depth_passed as f64 / self.pixels_tested as f64) * 100.0;
            log::info!("  depth test pass rate:       {:11.2}%", pass_rate);
        }
        log::info!("  texel samples skipped:      {:12}", self.texel_samples_skipped);
        log::info!("  colour saturations:         {:12}", self.color_saturations);

        log::info!("Framebuffer:");
        log::info!("  colour clears:              {:12}", self.framebuffer_clear_calls);
        log::info!("  depth clears:               {:12}", self.z_buffer_clear_calls);
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_every_counter() {
        let counters = FunctionCounters::new();
        counters.pixels_tested.store(7, Ordering::Relaxed);
        counters.z_buffer_clear_calls.store(3, Ordering::Relaxed);
        counters.reset();
        let snap = counters.snapshot();
        assert_eq!(snap.pixels_tested, 0);
        assert_eq!(snap.z_buffer_clear_calls, 0);
    }
}
