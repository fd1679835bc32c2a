/// Performance measurement utilities
/// Each pipeline stage is timed per frame for optimization analysis
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};

use std::time::{Duration, Instant};

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn elapsed_us(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1_000_000.0
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        log::trace!("[PERF] {}: {:.2}μs", self.name, self.elapsed_us());
    }
}

/// Per-frame stage timings in microseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfStats {
    pub clear_us: f64,
    pub clipping_us: f64,
    pub projection_us: f64,
    pub rasterization_us: f64,
    pub total_us: f64,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate another frame's timings.
    pub fn accumulate(&mut self, other: &PerfStats) {
        self.clear_us += other.clear_us;
        self.clipping_us += other.clipping_us;
        self.projection_us += other.projection_us;
        self.rasterization_us += other.rasterization_us;
        self.total_us += other.total_us;
    }

    fn share(&self, part: f64) -> f64 {
        if self.total_us > 0.0 {
            (part / self.total_us) * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        log::info!("========== PERFORMANCE SUMMARY ==========");
        log::info!("Clear:           {:10.2}μs ({:5.1}%)", self.clear_us, self.share(self.clear_us));
        log::info!("Clipping:        {:10.2}μs ({:5.1}%)", self.clipping_us, self.share(self.clipping_us));
        log::info!("Projection:      {:10.2}μs ({:5.1}%)", self.projection_us, self.share(self.projection_us));
        log::info!(
            "Rasterization:   {:10.2}μs ({:5.1}%)",
            self.rasterization_us,
            self.share(self.rasterization_us)
        );
        log::info!("─────────────────────────────────────────");
        log::info!("Total:           {:10.2}μs", self.total_us);
    }
}
