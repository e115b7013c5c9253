//! Frame timing.
//!
//! Every rate in the engine is expressed per *reference frame* at 60 Hz:
//! "smooth by 0.1 per frame", "spin 0.002 rad per frame". A host that runs at
//! a different cadence passes its real frame time as `dt` and the rates are
//! rescaled so the motion looks the same.
//!
//! # Example
//!
//! ```ignore
//! use morphcloud::time::FrameClock;
//!
//! let mut clock = FrameClock::fixed(FRAME_DT);
//!
//! // In your frame loop:
//! let dt = clock.tick();
//! sim.advance(&reading, dt);
//! ```

use std::time::Instant;

/// Frame rate the per-frame constants were tuned at.
pub const REFERENCE_FPS: f32 = 60.0;

/// Duration of one reference frame in seconds.
pub const FRAME_DT: f32 = 1.0 / REFERENCE_FPS;

/// Upper bound on reference frames consumed by a single step.
///
/// A host that stalls for seconds resumes with at most this much motion.
pub const MAX_FRAMES_PER_STEP: f32 = 4.0;

/// Number of reference frames covered by `dt` seconds.
///
/// Non-positive or non-finite `dt` is a paused step and yields `0.0`.
pub fn frame_scale(dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    (dt * REFERENCE_FPS).min(MAX_FRAMES_PER_STEP)
}

/// Rescale a per-frame exponential approach rate to `frames` reference frames.
///
/// Exactly one frame returns `rate` unchanged.
#[inline]
pub fn per_frame_rate(rate: f32, frames: f32) -> f32 {
    if (frames - 1.0).abs() < 1e-4 {
        rate
    } else {
        1.0 - (1.0 - rate).powf(frames)
    }
}

/// Rescale a per-frame multiplicative decay to `frames` reference frames.
#[inline]
pub fn per_frame_decay(decay: f32, frames: f32) -> f32 {
    if (frames - 1.0).abs() < 1e-4 {
        decay
    } else {
        decay.powf(frames)
    }
}

/// Frame clock for caller-owned loops.
///
/// Produces the `dt` handed to [`Simulation::advance`](crate::Simulation::advance),
/// either measured from wall time or fixed for deterministic runs.
#[derive(Debug)]
pub struct FrameClock {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Total frames since start.
    frame_count: u64,
    /// Whether time is paused.
    paused: bool,
}

impl FrameClock {
    /// Clock measuring real time between ticks.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            fixed_delta: None,
            frame_count: 0,
            paused: false,
        }
    }

    /// Clock that reports `delta` seconds every tick.
    pub fn fixed(delta: f32) -> Self {
        Self {
            fixed_delta: Some(delta),
            ..Self::new()
        }
    }

    /// Advance the clock and return the step's `dt` in seconds.
    ///
    /// Returns `0.0` while paused.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            return 0.0;
        }
        self.frame_count += 1;
        self.fixed_delta.unwrap_or(raw)
    }

    /// Total frames ticked while running.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Whether the clock is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_scale() {
        assert!((frame_scale(FRAME_DT) - 1.0).abs() < 1e-4);
        assert!((frame_scale(FRAME_DT * 2.0) - 2.0).abs() < 1e-4);
        assert_eq!(frame_scale(0.0), 0.0);
        assert_eq!(frame_scale(-1.0), 0.0);
        assert_eq!(frame_scale(f32::NAN), 0.0);
        assert_eq!(frame_scale(10.0), MAX_FRAMES_PER_STEP);
    }

    #[test]
    fn test_per_frame_rate_single_frame_exact() {
        assert_eq!(per_frame_rate(0.05, frame_scale(FRAME_DT)), 0.05);
        assert_eq!(per_frame_decay(0.95, 1.0), 0.95);
    }

    #[test]
    fn test_per_frame_rate_two_frames() {
        // Two steps of 0.1 leave 0.81 of the gap.
        assert!((per_frame_rate(0.1, 2.0) - 0.19).abs() < 1e-5);
        assert!((per_frame_decay(0.95, 2.0) - 0.9025).abs() < 1e-5);
    }

    #[test]
    fn test_per_frame_rate_paused() {
        assert_eq!(per_frame_rate(0.1, 0.0), 0.0);
        assert_eq!(per_frame_decay(0.95, 0.0), 1.0);
    }

    #[test]
    fn test_fixed_clock() {
        let mut clock = FrameClock::fixed(FRAME_DT);
        assert_eq!(clock.tick(), FRAME_DT);
        assert_eq!(clock.frame(), 1);

        clock.toggle_pause();
        assert!(clock.is_paused());
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.frame(), 1);
    }
}
