//! Wall-clock time tracking for the frame loop

use std::time::{Duration, Instant};

/// Elapsed and per-frame time, measured from loop start
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    /// Start the clock now
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start the clock at a given instant
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance to the current instant
    pub fn update(&mut self) {
        self.update_to(Instant::now());
    }

    /// Advance to `now`. Instants earlier than the previous one count as a
    /// zero-length frame.
    pub fn update_to(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last);
        self.elapsed = now.saturating_duration_since(self.start);
        self.last = now;
        self.frame_count += 1;
    }

    /// Duration of the last frame
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Duration of the last frame in milliseconds
    pub fn delta_ms(&self) -> f32 {
        (self.delta.as_nanos() as f64 / 1_000_000.0) as f32
    }

    /// Time since the clock started, in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Number of `update` calls so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_to_tracks_delta_and_elapsed() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);

        time.update_to(start + Duration::from_millis(20));
        time.update_to(start + Duration::from_millis(50));

        assert_eq!(time.delta(), Duration::from_millis(30));
        assert!((time.delta_ms() - 30.0).abs() < 1e-3);
        assert!((time.elapsed_seconds() - 0.05).abs() < 1e-9);
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn test_backwards_instant_is_zero_delta() {
        let start = Instant::now();
        let mut time = Time::starting_at(start + Duration::from_millis(10));

        time.update_to(start);

        assert_eq!(time.delta(), Duration::ZERO);
    }
}
