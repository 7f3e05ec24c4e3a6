//! Fixed-timestep update scheduling
//!
//! Simulation advances in ticks of a constant length derived from the
//! updates-per-second setting, while rendering happens once per loop
//! iteration with whatever frame time elapsed.

use serde::{Deserialize, Serialize};

use crate::renderer::RenderBackend;
use crate::scene::Scene;

/// How the accumulator is drained once it reaches the tick period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickPolicy {
    /// Subtract the tick period for each update run, carrying the remainder
    /// into the next frame.
    #[default]
    CatchUp,
    /// Run at most one update per frame and discard the leftover time. Under
    /// load the simulation slows down instead of catching up.
    Reset,
}

/// Outcome of one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Fixed updates run during this frame
    pub updates: u32,
}

/// Decides how many fixed updates each rendered frame runs.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    tick_ms: f32,
    accumulator_ms: f32,
    policy: TickPolicy,
    max_updates_per_frame: u32,
    total_updates: u64,
    total_frames: u64,
}

impl FrameScheduler {
    /// Default catch-up cap per frame
    pub const DEFAULT_MAX_UPDATES: u32 = 5;

    /// Scheduler ticking `updates_per_second` times a second. A rate of zero
    /// is treated as one update per second.
    pub fn new(updates_per_second: u32, policy: TickPolicy) -> Self {
        Self {
            tick_ms: 1000.0 / updates_per_second.max(1) as f32,
            accumulator_ms: 0.0,
            policy,
            max_updates_per_frame: Self::DEFAULT_MAX_UPDATES,
            total_updates: 0,
            total_frames: 0,
        }
    }

    /// Cap the number of catch-up updates per frame (minimum one)
    pub fn with_max_updates_per_frame(mut self, max: u32) -> Self {
        self.max_updates_per_frame = max.max(1);
        self
    }

    /// Length of one tick in milliseconds
    pub fn tick_ms(&self) -> f32 {
        self.tick_ms
    }

    /// Time accumulated towards the next tick
    pub fn accumulator_ms(&self) -> f32 {
        self.accumulator_ms
    }

    pub fn policy(&self) -> TickPolicy {
        self.policy
    }

    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Add `frame_ms` to the accumulator and return how many updates are due.
    pub fn advance(&mut self, frame_ms: f32) -> u32 {
        self.accumulator_ms += frame_ms.max(0.0);

        let due = match self.policy {
            TickPolicy::Reset => {
                if self.accumulator_ms >= self.tick_ms {
                    self.accumulator_ms = 0.0;
                    1
                } else {
                    0
                }
            }
            TickPolicy::CatchUp => {
                let mut due = 0;
                while self.accumulator_ms >= self.tick_ms && due < self.max_updates_per_frame {
                    self.accumulator_ms -= self.tick_ms;
                    due += 1;
                }
                if self.accumulator_ms >= self.tick_ms {
                    log::warn!(
                        "Dropping {:.1}ms of simulation time (cap of {} updates per frame)",
                        self.accumulator_ms - self.accumulator_ms % self.tick_ms,
                        self.max_updates_per_frame
                    );
                    self.accumulator_ms %= self.tick_ms;
                }
                due
            }
        };

        self.total_updates += u64::from(due);
        self.total_frames += 1;
        due
    }

    /// Run one loop iteration against a scene: the due fixed updates, then
    /// exactly one render.
    pub fn run_frame(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
        time: f64,
        frame_ms: f32,
    ) -> FrameReport {
        let updates = self.advance(frame_ms);
        for _ in 0..updates {
            scene.update(time, self.tick_ms);
        }
        scene.render(time as f32, frame_ms, backend);

        FrameReport { updates }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(20, TickPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::core::EventBus;
    use crate::renderer::{DepthRange, RecordingBackend};
    use crate::scene::{ObjectHandle, ObjectKind, SceneObject};

    #[derive(Debug, Default)]
    struct Probe {
        updates: Rc<Cell<u32>>,
        renders: Rc<Cell<u32>>,
    }

    impl SceneObject for Probe {
        fn kind(&self) -> ObjectKind {
            ObjectKind::Group
        }

        fn update(&mut self, _time: f64, _tick_ms: f32) {
            self.updates.set(self.updates.get() + 1);
        }

        fn render(&mut self, _time: f32, _frame_ms: f32, _backend: &mut dyn RenderBackend) {
            self.renders.set(self.renders.get() + 1);
        }
    }

    #[test]
    fn test_tick_period_from_rate() {
        let scheduler = FrameScheduler::new(20, TickPolicy::CatchUp);
        assert!((scheduler.tick_ms() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_three_short_frames_run_one_update() {
        for policy in [TickPolicy::CatchUp, TickPolicy::Reset] {
            let mut scheduler = FrameScheduler::new(20, policy);
            let due: Vec<u32> = [20.0, 20.0, 20.0]
                .into_iter()
                .map(|ms| scheduler.advance(ms))
                .collect();
            assert_eq!(due, vec![0, 0, 1], "{policy:?}");
            assert_eq!(scheduler.total_updates(), 1);
            assert_eq!(scheduler.total_frames(), 3);
        }
    }

    #[test]
    fn test_reset_discards_leftover() {
        let mut scheduler = FrameScheduler::new(20, TickPolicy::Reset);
        assert_eq!(scheduler.advance(120.0), 1);
        assert_eq!(scheduler.accumulator_ms(), 0.0);
    }

    #[test]
    fn test_catch_up_carries_remainder() {
        let mut scheduler = FrameScheduler::new(20, TickPolicy::CatchUp);
        assert_eq!(scheduler.advance(120.0), 2);
        assert!((scheduler.accumulator_ms() - 20.0).abs() < 1e-4);
        assert_eq!(scheduler.advance(30.0), 1);
        assert!(scheduler.accumulator_ms().abs() < 1e-4);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut scheduler =
            FrameScheduler::new(20, TickPolicy::CatchUp).with_max_updates_per_frame(3);
        assert_eq!(scheduler.advance(1000.0), 3);
        assert!(scheduler.accumulator_ms() < scheduler.tick_ms());
    }

    #[test]
    fn test_run_frame_renders_every_frame() {
        let bus = Rc::new(EventBus::new());
        let mut backend = RecordingBackend::new(DepthRange::ZeroToOne);
        let mut scene = Scene::new("Frames", Rc::clone(&bus), &Default::default(), &backend);

        let probe = Probe::default();
        let updates = Rc::clone(&probe.updates);
        let renders = Rc::clone(&probe.renders);
        scene.add(ObjectHandle::new(probe));
        // Commit the probe before counting.
        scene.update(0.0, 50.0);
        updates.set(0);

        let mut scheduler = FrameScheduler::new(20, TickPolicy::CatchUp);
        let mut reports = Vec::new();
        for ms in [20.0, 20.0, 20.0] {
            reports.push(scheduler.run_frame(&mut scene, &mut backend, 0.0, ms));
        }

        assert_eq!(reports.iter().map(|r| r.updates).sum::<u32>(), 1);
        assert_eq!(updates.get(), 1);
        assert_eq!(renders.get(), 3);
    }
}
