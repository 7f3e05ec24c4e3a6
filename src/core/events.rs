//! Event Bus for Decoupled Communication
//!
//! Device callbacks publish input events here; gameplay systems such as the
//! flying camera subscribe to the kinds they care about. The scene publishes
//! lifecycle events through the same bus.
//!
//! # Design Principles
//!
//! - **Explicit ownership**: the bus is an ordinary value shared through `Rc`,
//!   not hidden global state
//! - **Ordered**: callbacks run in subscription order, synchronously, on the
//!   publishing thread
//! - **Append-only**: subscriptions cannot be removed
//!
//! # Example
//!
//! ```ignore
//! let bus = EventBus::new();
//!
//! bus.subscribe(EventKind::KeyPressed, |event| {
//!     if let Event::KeyPressed(key) = event {
//!         log::info!("{:?} pressed: {}", key.key, key.pressed);
//!     }
//! });
//!
//! bus.publish(&Event::KeyPressed(KeyEvent::new(KeyCode::KeyW, true)));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::scene::ObjectHandle;

// ============================================================================
// Event Types
// ============================================================================

/// Discriminant used to key subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A keyboard key changed state
    KeyPressed,
    /// A mouse button changed state
    MouseButton,
    /// The cursor moved
    MouseMoved,
    /// An object was handed to a scene
    ObjectAddedToScene,
}

/// Payload of a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key code
    pub key: KeyCode,
    /// `true` on press, `false` on release
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn new(key: KeyCode, pressed: bool) -> Self {
        Self { key, pressed }
    }
}

/// Payload of a mouse button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub pressed: bool,
}

impl MouseButtonEvent {
    pub const fn new(button: MouseButton, pressed: bool) -> Self {
        Self { button, pressed }
    }
}

/// Payload of a cursor movement, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMoveEvent {
    pub x: f64,
    pub y: f64,
}

impl MouseMoveEvent {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Events carried by the bus.
#[derive(Debug, Clone)]
pub enum Event {
    KeyPressed(KeyEvent),
    MouseButton(MouseButtonEvent),
    MouseMoved(MouseMoveEvent),
    /// Published as soon as an object is queued for addition, before it
    /// becomes live in the scene registry.
    ObjectAddedToScene(ObjectHandle),
}

impl Event {
    /// Kind used to select subscribers.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KeyPressed(_) => EventKind::KeyPressed,
            Self::MouseButton(_) => EventKind::MouseButton,
            Self::MouseMoved(_) => EventKind::MouseMoved,
            Self::ObjectAddedToScene(_) => EventKind::ObjectAddedToScene,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Subscriber callback.
pub type Callback = Rc<dyn Fn(&Event)>;

type SubscriberList = SmallVec<[Callback; 4]>;

/// Publish/subscribe registry keyed by [`EventKind`].
///
/// Dispatch iterates a snapshot of the subscriber list taken when `publish`
/// starts, so a callback may publish again or subscribe new callbacks without
/// tripping the internal borrow. Callbacks subscribed mid-dispatch first run
/// on the next publish.
///
/// A panic inside a callback is not caught: it unwinds into the publisher and
/// the remaining callbacks for that publish are skipped.
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<FxHashMap<EventKind, SubscriberList>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `kind`, after every callback already
    /// registered for it.
    pub fn subscribe(&self, kind: EventKind, callback: impl Fn(&Event) + 'static) {
        log::debug!("Subscribed to {kind:?}");
        self.subscribers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(Rc::new(callback));
    }

    /// Invoke every callback registered for the event's kind, in
    /// subscription order. Publishing a kind nobody listens to does nothing.
    pub fn publish(&self, event: &Event) {
        let kind = event.kind();
        let snapshot: SubscriberList = match self.subscribers.borrow().get(&kind) {
            Some(list) => list.clone(),
            None => return,
        };

        log::trace!("Dispatching {kind:?} to {} subscribers", snapshot.len());
        for callback in &snapshot {
            callback(event);
        }
    }

    /// Number of callbacks registered for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.borrow().get(&kind).map_or(0, SmallVec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.borrow();
        let mut counts: Vec<_> = subscribers.iter().map(|(k, v)| (*k, v.len())).collect();
        counts.sort_by_key(|(k, _)| *k as u8);
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(pressed: bool) -> Event {
        Event::KeyPressed(KeyEvent::new(KeyCode::KeyW, pressed))
    }

    #[test]
    fn test_publish_runs_all_callbacks_in_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..5 {
            let log = Rc::clone(&log);
            bus.subscribe(EventKind::KeyPressed, move |_| log.borrow_mut().push(i));
        }

        bus.publish(&key(true));

        assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(&Event::MouseMoved(MouseMoveEvent::new(1.0, 2.0)));
        assert_eq!(bus.subscriber_count(EventKind::MouseMoved), 0);
    }

    #[test]
    fn test_publish_only_reaches_matching_kind() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        bus.subscribe(EventKind::MouseMoved, move |_| counter.set(counter.get() + 1));

        bus.publish(&key(true));
        assert_eq!(hits.get(), 0);

        bus.publish(&Event::MouseMoved(MouseMoveEvent::new(3.0, 4.0)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_callback_receives_payload() {
        let bus = EventBus::new();
        let seen = Rc::new(Cell::new(None));

        let slot = Rc::clone(&seen);
        bus.subscribe(EventKind::MouseButton, move |event| {
            if let Event::MouseButton(button) = event {
                slot.set(Some(*button));
            }
        });

        bus.publish(&Event::MouseButton(MouseButtonEvent::new(
            MouseButton::Right,
            true,
        )));

        assert_eq!(
            seen.get(),
            Some(MouseButtonEvent::new(MouseButton::Right, true))
        );
    }

    #[test]
    fn test_subscribe_during_dispatch_takes_effect_next_publish() {
        let bus = Rc::new(EventBus::new());
        let late_hits = Rc::new(Cell::new(0));

        let bus_handle = Rc::clone(&bus);
        let hits = Rc::clone(&late_hits);
        bus.subscribe(EventKind::KeyPressed, move |_| {
            let hits = Rc::clone(&hits);
            bus_handle.subscribe(EventKind::KeyPressed, move |_| hits.set(hits.get() + 1));
        });

        bus.publish(&key(true));
        assert_eq!(late_hits.get(), 0);
        assert_eq!(bus.subscriber_count(EventKind::KeyPressed), 2);

        bus.publish(&key(false));
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_reentrant_publish() {
        let bus = Rc::new(EventBus::new());
        let depth = Rc::new(Cell::new(0));

        let bus_handle = Rc::clone(&bus);
        let counter = Rc::clone(&depth);
        bus.subscribe(EventKind::KeyPressed, move |event| {
            counter.set(counter.get() + 1);
            if let Event::KeyPressed(key) = event
                && key.pressed
            {
                bus_handle.publish(&Event::KeyPressed(KeyEvent::new(key.key, false)));
            }
        });

        bus.publish(&key(true));
        assert_eq!(depth.get(), 2);
    }

    #[test]
    #[should_panic(expected = "subscriber failure")]
    fn test_callback_panic_reaches_publisher() {
        let bus = EventBus::new();
        bus.subscribe(EventKind::KeyPressed, |_| panic!("subscriber failure"));
        bus.publish(&key(true));
    }
}
