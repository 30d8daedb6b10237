//! Button Module - Press/bump/release gesture decoding
//!
//! Turns a boolean "is pressed" sample stream into discrete events and
//! latched state. One decoder per physical button: every touch sensor
//! owns one, the brick owns five.
//!
//! Event order on an up edge is Released then Bumped. A bump needs a
//! completed press-and-release cycle, so it can only fire on the up edge.
//!
//! # API
//!
//! - `update(pressed)` - Feed the next debounced sample
//! - `is_pressed()` - Current state, no side effect
//! - `was_pressed()` - Latched since-last-check state, read-and-reset
//! - `on_event(event, fn)` - Subscribe to an event
//! - `waiter(event)` - Blocking one-shot gate for the next edge
//!
//! # Example
//!
//! ```ignore
//! use brick_sim::state::button::Button;
//! use brick_sim::types::ButtonEvent;
//!
//! let mut button = Button::new();
//! button.on_event(ButtonEvent::Bumped, || println!("bumped!"));
//!
//! button.update(true);
//! button.update(false); // prints "bumped!"
//! ```

use std::sync::{Arc, Condvar, Mutex};

use crate::types::ButtonEvent;

// =============================================================================
// TYPES
// =============================================================================

/// Callback invoked when a button event fires.
pub type EventHandler = Box<dyn FnMut() + Send>;

/// Identifies a registered handler for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(usize);

struct HandlerEntry {
    id: usize,
    event: ButtonEvent,
    callback: EventHandler,
}

struct WaiterEntry {
    event: ButtonEvent,
    gate: Arc<WaitGate>,
}

// =============================================================================
// WAIT GATE
// =============================================================================

/// One-shot gate a waiting thread blocks on until the decoder opens it.
struct WaitGate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl WaitGate {
    fn new() -> Self {
        Self {
            open: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    fn open(&self) {
        let mut open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        *open = true;
        self.cv.notify_all();
    }

    fn is_open(&self) -> bool {
        *self.open.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        while !*open {
            open = self.cv.wait(open).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Handle returned by [`Button::waiter`].
///
/// `wait` blocks the calling thread until the subscribed event next
/// fires. There is no timeout: waiting on an event that never occurs
/// blocks forever, exactly like waiting on a physical button nobody
/// presses. Never call `wait` from the thread that drives
/// [`Button::update`].
pub struct EventWaiter {
    gate: Arc<WaitGate>,
}

impl EventWaiter {
    /// Block until the event fires. Returns immediately if it already has.
    pub fn wait(&self) {
        self.gate.wait();
    }

    /// Non-blocking check, for polling from the driving thread.
    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }
}

// =============================================================================
// BUTTON
// =============================================================================

/// Gesture decoder for one physical button.
///
/// Created once per button-bearing device and mutated only by its
/// owner's update path. Edge detection is against the stored state, so
/// repeated identical samples are no-ops.
pub struct Button {
    down: bool,
    was_pressed: bool,
    handlers: Vec<HandlerEntry>,
    waiters: Vec<WaiterEntry>,
    next_id: usize,
}

impl Button {
    pub fn new() -> Self {
        Self {
            down: false,
            was_pressed: false,
            handlers: Vec::new(),
            waiters: Vec::new(),
            next_id: 0,
        }
    }

    /// Feed the next debounced sample.
    ///
    /// On a down edge fires `Pressed` and sets the "was pressed" latch.
    /// On an up edge fires `Released` then `Bumped`. For each edge, all
    /// `on_event` callbacks run first (registration order), then all
    /// waiters are opened (registration order).
    pub fn update(&mut self, pressed: bool) {
        if pressed == self.down {
            return;
        }
        self.down = pressed;

        let fired: &[ButtonEvent] = if pressed {
            self.was_pressed = true;
            &[ButtonEvent::Pressed]
        } else {
            &[ButtonEvent::Released, ButtonEvent::Bumped]
        };

        for event in fired {
            self.run_handlers(*event);
        }
        for event in fired {
            self.open_waiters(*event);
        }
    }

    /// Current debounced state. No side effect.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.down
    }

    /// Whether a press happened since the last check. Clears the latch.
    pub fn was_pressed(&mut self) -> bool {
        let was = self.was_pressed;
        self.was_pressed = false;
        was
    }

    /// Register a persistent callback for an event.
    ///
    /// Multiple registrations for the same event are all invoked, in
    /// registration order.
    pub fn on_event<F>(&mut self, event: ButtonEvent, callback: F) -> HandlerId
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.push(HandlerEntry {
            id,
            event,
            callback: Box::new(callback),
        });
        HandlerId(id)
    }

    /// Remove a previously registered callback.
    pub fn remove_handler(&mut self, id: HandlerId) {
        self.handlers.retain(|entry| entry.id != id.0);
    }

    /// Register a one-shot waiter for the next occurrence of an event.
    ///
    /// The returned handle's `wait` suspends the calling thread until the
    /// edge fires; the gate opens strictly after the event's callbacks
    /// have run. Multiple waiters on the same event all open on the same
    /// edge and never block each other.
    pub fn waiter(&mut self, event: ButtonEvent) -> EventWaiter {
        let gate = Arc::new(WaitGate::new());
        self.waiters.push(WaiterEntry {
            event,
            gate: gate.clone(),
        });
        EventWaiter { gate }
    }

    /// Number of registered waiters still pending.
    pub fn pending_waiters(&self) -> usize {
        self.waiters.len()
    }

    fn run_handlers(&mut self, event: ButtonEvent) {
        for entry in self.handlers.iter_mut() {
            if entry.event == event {
                (entry.callback)();
            }
        }
    }

    fn open_waiters(&mut self, event: ButtonEvent) {
        self.waiters.retain(|entry| {
            if entry.event == event {
                entry.gate.open();
                false
            } else {
                true
            }
        });
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter(button: &mut Button, event: ButtonEvent) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        button.on_event(event, move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    // =========================================================================
    // Edge detection
    // =========================================================================

    #[test]
    fn test_event_counts_match_edges() {
        let mut button = Button::new();
        let pressed = counter(&mut button, ButtonEvent::Pressed);
        let released = counter(&mut button, ButtonEvent::Released);
        let bumped = counter(&mut button, ButtonEvent::Bumped);

        // Two complete cycles, one trailing press.
        for sample in [true, false, true, false, true] {
            button.update(sample);
        }

        assert_eq!(pressed.load(Ordering::SeqCst), 3);
        assert_eq!(released.load(Ordering::SeqCst), 2);
        assert_eq!(bumped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_repeated_samples_do_not_refire() {
        let mut button = Button::new();
        let pressed = counter(&mut button, ButtonEvent::Pressed);
        let released = counter(&mut button, ButtonEvent::Released);

        button.update(true);
        button.update(true);
        button.update(true);
        assert_eq!(pressed.load(Ordering::SeqCst), 1);

        button.update(false);
        button.update(false);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bumped_needs_complete_cycle() {
        let mut button = Button::new();
        let bumped = counter(&mut button, ButtonEvent::Bumped);

        button.update(true);
        assert_eq!(bumped.load(Ordering::SeqCst), 0);

        // Reading the latch is not a release.
        let _ = button.was_pressed();
        assert_eq!(bumped.load(Ordering::SeqCst), 0);

        button.update(false);
        assert_eq!(bumped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_released_fires_before_bumped() {
        let mut button = Button::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let order_clone = order.clone();
        button.on_event(ButtonEvent::Bumped, move || {
            order_clone.lock().unwrap().push("bumped");
        });
        let order_clone = order.clone();
        button.on_event(ButtonEvent::Released, move || {
            order_clone.lock().unwrap().push("released");
        });

        button.update(true);
        button.update(false);

        assert_eq!(*order.lock().unwrap(), vec!["released", "bumped"]);
    }

    // =========================================================================
    // Latched state
    // =========================================================================

    #[test]
    fn test_is_pressed_tracks_state() {
        let mut button = Button::new();
        assert!(!button.is_pressed());
        button.update(true);
        assert!(button.is_pressed());
        button.update(false);
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_was_pressed_reads_and_resets() {
        let mut button = Button::new();
        assert!(!button.was_pressed());

        button.update(true);
        button.update(false);

        assert!(button.was_pressed());
        assert!(!button.was_pressed()); // Latch cleared by the read
    }

    #[test]
    fn test_was_pressed_survives_until_read() {
        let mut button = Button::new();
        button.update(true);
        button.update(false);
        button.update(true);
        button.update(false);

        // Two cycles, one latched flag.
        assert!(button.was_pressed());
        assert!(!button.was_pressed());
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut button = Button::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order_clone = order.clone();
            button.on_event(ButtonEvent::Pressed, move || {
                order_clone.lock().unwrap().push(tag);
            });
        }

        button.update(true);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_handler() {
        let mut button = Button::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let id = button.on_event(ButtonEvent::Pressed, move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        button.update(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        button.remove_handler(id);
        button.update(false);
        button.update(true);
        assert_eq!(count.load(Ordering::SeqCst), 1); // No more increments
    }

    // =========================================================================
    // Waiters
    // =========================================================================

    #[test]
    fn test_waiter_opens_on_edge() {
        let mut button = Button::new();
        let waiter = button.waiter(ButtonEvent::Pressed);
        assert!(!waiter.is_open());

        button.update(true);
        assert!(waiter.is_open());
        waiter.wait(); // Already open, returns immediately
    }

    #[test]
    fn test_waiter_is_one_shot() {
        let mut button = Button::new();
        let waiter = button.waiter(ButtonEvent::Pressed);

        button.update(true);
        assert!(waiter.is_open());
        assert_eq!(button.pending_waiters(), 0);

        // A fresh waiter arms for the next edge only.
        let waiter = button.waiter(ButtonEvent::Pressed);
        assert!(!waiter.is_open());
        button.update(false);
        assert!(!waiter.is_open());
        button.update(true);
        assert!(waiter.is_open());
    }

    #[test]
    fn test_multiple_waiters_same_event_all_open() {
        let mut button = Button::new();
        let first = button.waiter(ButtonEvent::Bumped);
        let second = button.waiter(ButtonEvent::Bumped);

        button.update(true);
        assert!(!first.is_open());

        button.update(false);
        assert!(first.is_open());
        assert!(second.is_open());
    }

    #[test]
    fn test_waiter_wrong_event_stays_closed() {
        let mut button = Button::new();
        let waiter = button.waiter(ButtonEvent::Released);

        button.update(true);
        assert!(!waiter.is_open());
        assert_eq!(button.pending_waiters(), 1);
    }

    #[test]
    fn test_waiter_opens_after_handlers() {
        // A handler on the same edge observes the gate still closed.
        let mut button = Button::new();
        let waiter = button.waiter(ButtonEvent::Pressed);
        let gate_was_closed = Arc::new(AtomicUsize::new(0));

        let gate = waiter.gate.clone();
        let seen = gate_was_closed.clone();
        button.on_event(ButtonEvent::Pressed, move || {
            if !gate.is_open() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        button.update(true);
        assert_eq!(gate_was_closed.load(Ordering::SeqCst), 1);
        assert!(waiter.is_open());
    }

    #[test]
    fn test_waiter_blocks_thread_until_edge() {
        let mut button = Button::new();
        let waiter = button.waiter(ButtonEvent::Pressed);

        let handle = std::thread::spawn(move || {
            waiter.wait();
        });

        // Give the waiter a moment to block, then release it.
        std::thread::sleep(std::time::Duration::from_millis(20));
        button.update(true);

        handle.join().unwrap();
    }
}
