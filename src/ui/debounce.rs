//! Quiescence-window debouncing driven by an explicit clock.
//!
//! A [`Debouncer`] holds at most one pending action. Scheduling again before
//! the window elapses replaces the pending action and restarts the window, so
//! only the last action of a burst ever fires. Nothing runs on its own: the
//! owner calls [`Debouncer::poll`] with the current time and runs whatever
//! comes back. Tests drive time with a [`ManualClock`].
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Single-slot debouncer for actions of type `A`.
#[derive(Debug, Clone)]
pub struct Debouncer<A> {
    window: Duration,
    pending: Option<Pending<A>>,
}

#[derive(Debug, Clone)]
struct Pending<A> {
    deadline: Duration,
    action: A,
}

impl<A> Debouncer<A> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Defer `action` until `now + window`, replacing anything pending.
    pub fn schedule(&mut self, now: Duration, action: A) {
        self.pending = Some(Pending {
            deadline: now + self.window,
            action,
        });
    }

    /// Drop the pending action, if any, and return it.
    pub fn cancel_pending(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.action)
    }

    /// Take the pending action if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Duration) -> Option<A> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if due {
            self.pending.take().map(|p| p.action)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending action becomes due.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
