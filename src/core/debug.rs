//! Frame statistics

use std::collections::VecDeque;

/// Rolling frame-time statistics
#[derive(Debug, Clone)]
pub struct FrameStats {
    /// Frame time history in milliseconds
    frame_times: VecDeque<f32>,
    /// Maximum samples to keep
    max_samples: usize,
    fps: f32,
    avg_frame_time_ms: f32,
    min_frame_time_ms: f32,
    max_frame_time_ms: f32,
    total_frames: u64,
    total_updates: u64,
}

impl FrameStats {
    /// Samples kept when none is specified
    pub const DEFAULT_SAMPLES: usize = 120;

    /// Create a new frame stats tracker
    pub fn new() -> Self {
        Self::with_samples(Self::DEFAULT_SAMPLES)
    }

    /// Keep the last `max_samples` frames (at least one)
    pub fn with_samples(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            fps: 0.0,
            avg_frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            total_frames: 0,
            total_updates: 0,
        }
    }

    /// Record a rendered frame and the fixed updates it ran
    pub fn record_frame(&mut self, frame_ms: f32, updates: u32) {
        self.total_frames += 1;
        self.total_updates += u64::from(updates);

        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_ms.max(0.0));

        self.update_stats();
    }

    fn update_stats(&mut self) {
        let count = self.frame_times.len() as f32;
        let total: f32 = self.frame_times.iter().sum();
        let (min, max) = self
            .frame_times
            .iter()
            .fold((f32::MAX, 0.0_f32), |(lo, hi), &ms| (lo.min(ms), hi.max(ms)));

        // Guard against division by zero
        if total > 0.0 {
            self.avg_frame_time_ms = total / count;
            self.fps = count * 1000.0 / total;
        } else {
            self.avg_frame_time_ms = 0.0;
            self.fps = 0.0;
        }

        self.min_frame_time_ms = min;
        self.max_frame_time_ms = max;
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time_ms
    }

    pub fn min_frame_time_ms(&self) -> f32 {
        self.min_frame_time_ms
    }

    pub fn max_frame_time_ms(&self) -> f32 {
        self.max_frame_time_ms
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "FPS: {:.1} | Frame: {:.2}ms (min: {:.2}, max: {:.2}) | Updates: {}",
            self.fps,
            self.avg_frame_time_ms,
            self.min_frame_time_ms,
            self.max_frame_time_ms,
            self.total_updates
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages_over_window() {
        let mut stats = FrameStats::with_samples(2);
        stats.record_frame(100.0, 0);
        stats.record_frame(10.0, 1);
        stats.record_frame(30.0, 0);

        assert_eq!(stats.total_frames(), 3);
        assert_eq!(stats.total_updates(), 1);
        assert!((stats.avg_frame_time_ms() - 20.0).abs() < 1e-4);
        assert!((stats.fps() - 50.0).abs() < 1e-3);
        assert_eq!(stats.min_frame_time_ms(), 10.0);
        assert_eq!(stats.max_frame_time_ms(), 30.0);
    }

    #[test]
    fn test_zero_length_frames() {
        let mut stats = FrameStats::new();
        stats.record_frame(0.0, 0);
        assert_eq!(stats.fps(), 0.0);
        assert!(stats.format_stats().starts_with("FPS: 0.0"));
    }
}
