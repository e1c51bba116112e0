//! Game clock with frame-interval pacing

use std::time::{Duration, Instant};

/// Longest delta handed to systems; longer stalls are clamped
const MAX_DELTA: f64 = 0.25;

/// Slowest accepted target frame rate
pub const MIN_FPS: f64 = 1.0;
/// Fastest accepted target frame rate
pub const MAX_FPS: f64 = 1000.0;

/// Tracks frame time and how long to wait to hold a target frame interval
pub struct GameClock {
    /// Total elapsed game time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Target interval between frames (default: 20ms, 50 fps)
    pub frame_interval: Duration,
    /// Number of ticks so far
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_interval: Duration::from_millis(20),
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    /// Create a new game clock targeting 50 fps
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game clock targeting `fps` frames per second, clamped to
    /// `MIN_FPS..=MAX_FPS`. Non-positive or NaN rates fall back to 50.
    pub fn with_target_fps(fps: f64) -> Self {
        let fps = if fps > 0.0 {
            fps.clamp(MIN_FPS, MAX_FPS)
        } else {
            50.0
        };
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / fps),
            ..Self::default()
        }
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance by a known amount of time (headless simulation, tests)
    pub fn advance(&mut self, elapsed: f64) {
        if elapsed > MAX_DELTA {
            log::debug!("[clock] clamping {elapsed:.3}s frame to {MAX_DELTA}s");
        }
        self.delta_time = elapsed.clamp(0.0, MAX_DELTA);
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }

    /// Time left in the current frame interval, measured from the last tick
    pub fn time_until_next_frame(&self) -> Duration {
        self.frame_interval
            .saturating_sub(self.last_instant.elapsed())
    }

    /// Frame interval in seconds
    pub fn frame_interval_secs(&self) -> f64 {
        self.frame_interval.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = GameClock::new();
        assert_eq!(clock.frame_interval, Duration::from_millis(20));
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
    }

    #[test]
    fn test_target_fps() {
        let clock = GameClock::with_target_fps(60.0);
        assert!((clock.frame_interval_secs() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_fps_falls_back() {
        let clock = GameClock::with_target_fps(0.0);
        assert_eq!(clock.frame_interval, Duration::from_millis(20));
    }

    #[test]
    fn test_extreme_fps_is_clamped() {
        let slow = GameClock::with_target_fps(1e-20);
        assert_eq!(slow.frame_interval, Duration::from_secs(1));

        let fast = GameClock::with_target_fps(f64::INFINITY);
        assert_eq!(fast.frame_interval, Duration::from_millis(1));

        let nan = GameClock::with_target_fps(f64::NAN);
        assert_eq!(nan.frame_interval, Duration::from_millis(20));
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = GameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 0);
    }

    #[test]
    fn test_advance_clamps_long_frames() {
        let mut clock = GameClock::new();
        clock.advance(2.0);
        assert_eq!(clock.delta_time, MAX_DELTA);
        clock.advance(0.02);
        assert!((clock.total_time - (MAX_DELTA + 0.02)).abs() < 1e-9);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn test_pacing_never_exceeds_interval() {
        let mut clock = GameClock::new();
        clock.tick();
        assert!(clock.time_until_next_frame() <= clock.frame_interval);
    }
}
