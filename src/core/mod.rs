//! Core engine module
//!
//! Contains the engine loop, its scheduler and clock, configuration, and the
//! event bus.

mod config;
mod debug;
mod engine;
mod events;
mod scheduler;
mod time;

pub use config::{CameraConfig, ConfigError, EngineConfig};
pub use debug::FrameStats;
pub use engine::{Engine, EngineError};
pub use events::{
    Callback, Event, EventBus, EventKind, KeyEvent, MouseButtonEvent, MouseMoveEvent,
};
pub use scheduler::{FrameReport, FrameScheduler, TickPolicy};
pub use time::Time;
