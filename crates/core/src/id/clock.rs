//! Wall clock abstraction and the event timestamper.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Nanoseconds per millisecond.
pub const NS_PER_MILLISECOND: u64 = 1_000_000;

/// Source of wall-clock time.
pub trait Clock {
    /// Returns nanoseconds since the Unix epoch.
    fn now_ns(&self) -> u64;

    /// Returns milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64 {
        self.now_ns() / NS_PER_MILLISECOND
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        Utc::now()
            .timestamp_nanos_opt()
            .and_then(|ns| u64::try_from(ns).ok())
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// Time may be set backwards, which is how regressing wall clocks are
/// simulated.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `now_ns`.
    #[must_use]
    pub const fn new(now_ns: u64) -> Self {
        Self {
            now_ns: AtomicU64::new(now_ns),
        }
    }

    /// Creates a clock reading `now_ms` milliseconds.
    #[must_use]
    pub const fn from_millis(now_ms: u64) -> Self {
        Self::new(now_ms.saturating_mul(NS_PER_MILLISECOND))
    }

    /// Sets the current time.
    pub fn set(&self, now_ns: u64) {
        self.now_ns.store(now_ns, Ordering::Relaxed);
    }

    /// Moves the clock forward by `delta_ns`.
    pub fn advance(&self, delta_ns: u64) {
        let now = self.now_ns.load(Ordering::Relaxed);
        self.set(now.saturating_add(delta_ns));
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::Relaxed)
    }
}

/// Assigns strictly increasing timestamps to accepted events.
///
/// The candidate for the next event is `max(now, last + 1)`; `last` only
/// moves when an event is actually accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamper {
    last: u64,
}

impl Timestamper {
    /// Creates a timestamper whose last assigned timestamp is `last`.
    #[must_use]
    pub const fn new(last: u64) -> Self {
        Self { last }
    }

    /// Returns the last assigned timestamp.
    #[must_use]
    pub const fn last(&self) -> u64 {
        self.last
    }

    /// Returns the timestamp the next accepted event would receive.
    #[must_use]
    pub fn candidate(&self, now_ns: u64) -> u64 {
        now_ns.max(self.last.saturating_add(1))
    }

    /// Records `timestamp` as assigned. Older values are ignored.
    pub fn advance(&mut self, timestamp: u64) {
        self.last = self.last.max(timestamp);
    }
}
