use std::time::{Duration, Instant};

use tracing::debug;

/// Measures the wall-clock time between consecutive loop iterations.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { last: start }
    }

    /// Time since the previous tick (or since creation).
    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts rendered frames and reports a frame rate once per window.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: f32,
    elapsed: f32,
    frames: u32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new(window: f32) -> Self {
        Self {
            window,
            elapsed: 0.0,
            frames: 0,
            total_frames: 0,
        }
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
        self.total_frames += 1;
    }

    /// Advances the window by `delta_time`; returns the frame rate when a
    /// window completes.
    pub fn advance(&mut self, delta_time: f32) -> Option<f32> {
        self.elapsed += delta_time;
        if self.elapsed < self.window || self.elapsed <= 0.0 {
            return None;
        }

        let fps = self.frames as f32 / self.elapsed;
        debug!("{:.1} fps ({} frames in {:.3}s)", fps, self.frames, self.elapsed);
        self.elapsed = 0.0;
        self.frames = 0;
        Some(fps)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(1.0)
    }
}
