//! Platform layer
//!
//! A platform supplies input, time and the close signal to [`Engine::run`].
//! The windowed runner in [`window`] drives the same frame work from winit's
//! callbacks instead.
//!
//! [`Engine::run`]: crate::core::Engine::run

pub mod window;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::{Event, EventBus};

/// Source of input events, time and the close request.
pub trait Platform {
    /// Deliver pending input to `bus`.
    fn poll_events(&mut self, bus: &EventBus);

    /// Whether the loop should stop
    fn close_requested(&self) -> bool;

    /// Current time on this platform's clock
    fn now(&self) -> Instant;

    /// Release platform resources once the loop has ended.
    fn shutdown(&mut self) {}
}

/// One scripted loop iteration.
#[derive(Debug, Clone)]
pub struct ScriptedFrame {
    /// Time that passes before the frame
    pub frame_ms: f32,
    /// Published in order when the frame is polled
    pub events: Vec<Event>,
}

/// Deterministic platform for tests and tools: replays scripted frames, then
/// requests close.
#[derive(Debug)]
pub struct HeadlessPlatform {
    start: Instant,
    clock: Duration,
    frames: VecDeque<ScriptedFrame>,
    close_requested: bool,
    polled: u32,
    shut_down: bool,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            clock: Duration::ZERO,
            frames: VecDeque::new(),
            close_requested: false,
            polled: 0,
            shut_down: false,
        }
    }

    /// Append `count` frames of `frame_ms` with no input.
    pub fn with_frames(mut self, count: usize, frame_ms: f32) -> Self {
        for _ in 0..count {
            self.push_frame(frame_ms, Vec::new());
        }
        self
    }

    /// Append one frame carrying input events.
    pub fn with_frame(mut self, frame_ms: f32, events: Vec<Event>) -> Self {
        self.push_frame(frame_ms, events);
        self
    }

    pub fn push_frame(&mut self, frame_ms: f32, events: Vec<Event>) {
        self.frames.push_back(ScriptedFrame { frame_ms, events });
    }

    /// Stop before the remaining frames are played.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn frames_remaining(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames polled so far
    pub fn polled(&self) -> u32 {
        self.polled
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn poll_events(&mut self, bus: &EventBus) {
        let Some(frame) = self.frames.pop_front() else {
            self.close_requested = true;
            return;
        };

        self.polled += 1;
        self.clock += Duration::from_micros((frame.frame_ms.max(0.0) * 1000.0).round() as u64);
        for event in &frame.events {
            bus.publish(event);
        }
    }

    fn close_requested(&self) -> bool {
        self.close_requested || self.frames.is_empty()
    }

    fn now(&self) -> Instant {
        self.start + self.clock
    }

    fn shutdown(&mut self) {
        log::debug!("Headless platform shut down after {} frames", self.polled);
        self.shut_down = true;
    }
}
