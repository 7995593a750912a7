//=========================================================================
// Frame Timing
//=========================================================================
//
// Variable-step frame timing with a clamped simulation step.
//
// Per frame:
//   frametime = now - last           (raw, may be huge after a stall)
//   timestep  = min(frametime, max)  (what the simulation sees)
//   elapsed  += frametime
//
// Clamping keeps a long stall (debugger break, window drag) from
// producing one giant step the simulation cannot recover from.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

//=== Timestep ============================================================

/// A span of simulated time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestep(f32);

impl Timestep {
    pub fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    pub fn seconds(self) -> f32 {
        self.0
    }

    pub fn millis(self) -> f32 {
        self.0 * 1000.0
    }

    /// Returns the shorter of the two steps.
    pub fn min(self, other: Timestep) -> Timestep {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

impl From<Duration> for Timestep {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs_f32())
    }
}

//=== FrameTime ===========================================================

/// Timing sample produced once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Raw time since the previous frame.
    pub frametime: Timestep,

    /// Clamped step handed to the simulation.
    pub timestep: Timestep,

    /// Sum of all raw frame times so far.
    pub elapsed: Timestep,
}

//=== FrameTimer ==========================================================

/// Measures frame deltas and clamps them to a maximum step.
#[derive(Debug)]
pub struct FrameTimer {
    last: Instant,
    max_step: Timestep,
    elapsed: f32,
}

impl FrameTimer {
    /// Creates a timer whose first delta is measured from now.
    ///
    /// # Panics
    ///
    /// Panics if `max_step` is not positive.
    pub fn new(max_step: Timestep) -> Self {
        assert!(
            max_step.seconds() > 0.0,
            "Max timestep must be positive, got {}",
            max_step.seconds()
        );
        Self {
            last: Instant::now(),
            max_step,
            elapsed: 0.0,
        }
    }

    pub fn max_step(&self) -> Timestep {
        self.max_step
    }

    /// Samples the clock and returns this frame's timing.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        self.advance(delta)
    }

    /// Accounts for `delta` without reading the clock.
    pub fn advance(&mut self, delta: Duration) -> FrameTime {
        let frametime = Timestep::from(delta);
        self.elapsed += frametime.seconds();

        FrameTime {
            frametime,
            timestep: frametime.min(self.max_step),
            elapsed: Timestep(self.elapsed),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: Timestep = Timestep(0.0333);

    #[test]
    fn timestep_unit_conversions() {
        let step = Timestep::from_seconds(0.5);
        assert_eq!(step.seconds(), 0.5);
        assert_eq!(step.millis(), 500.0);
        assert_eq!(Timestep::from(Duration::from_millis(250)).seconds(), 0.25);
    }

    #[test]
    fn short_frames_pass_through() {
        let mut timer = FrameTimer::new(MAX);
        let time = timer.advance(Duration::from_millis(16));
        assert_eq!(time.timestep, time.frametime);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut timer = FrameTimer::new(MAX);
        let time = timer.advance(Duration::from_millis(600));

        assert_eq!(time.timestep, MAX, "Stall must be clamped to the max step");
        assert!((time.frametime.seconds() - 0.6).abs() < 1e-6, "Raw frametime is kept");
    }

    #[test]
    fn elapsed_accumulates_raw_frametime() {
        let mut timer = FrameTimer::new(MAX);
        timer.advance(Duration::from_millis(100));
        let time = timer.advance(Duration::from_millis(200));

        assert!((time.elapsed.seconds() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn tick_measures_wall_clock() {
        let mut timer = FrameTimer::new(MAX);
        std::thread::sleep(Duration::from_millis(10));
        let time = timer.tick();

        assert!(time.frametime.seconds() >= 0.010);
        assert!(time.timestep <= MAX);
    }

    #[test]
    #[should_panic(expected = "Max timestep must be positive")]
    fn zero_max_step_panics() {
        FrameTimer::new(Timestep::from_seconds(0.0));
    }
}
