//! Frame timing.
//!
//! The game loop runs on a fixed tick derived from the configured framerate.
//! [`Time`] records the nominal tick length alongside what was actually
//! measured, and counts completed frames.

use std::time::{Duration, Instant};

/// Frame timing state. Owned by [`GameCore`](crate::game::GameCore) and lent
/// read-only to callbacks.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// When the game was created.
    startup: Instant,
    /// When the current frame started.
    frame_start: Instant,
    /// Nominal length of one tick.
    tick: Duration,
    /// Measured duration between the last two frame starts.
    delta: Duration,
    /// Total time since startup, as of the current frame start.
    elapsed: Duration,
    /// Completed frames.
    frame_count: u64,
}

impl Time {
    /// `framerate` must be non-zero; [`GameCore::init`](crate::game::GameCore::init)
    /// validates it before getting here.
    pub(crate) fn new(framerate: u32) -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            frame_start: now,
            tick: tick_duration(framerate),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Call at the start of each frame.
    pub(crate) fn begin_frame(&mut self) {
        let now = Instant::now();
        self.delta = now - self.frame_start;
        self.frame_start = now;
        self.elapsed = now - self.startup;
    }

    /// Call once the frame is complete.
    pub(crate) fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    pub(crate) fn frame_start(&self) -> Instant {
        self.frame_start
    }

    /// Nominal tick length (1 / framerate).
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Measured duration of the previous frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total elapsed time since the game was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of frames completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }

    /// True on every `n`th completed frame (and on frame 0). `n == 0` never fires.
    pub fn every(&self, n: u64) -> bool {
        n != 0 && self.frame_count % n == 0
    }
}

fn tick_duration(framerate: u32) -> Duration {
    Duration::from_secs(1) / framerate.max(1)
}
