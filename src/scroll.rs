//! Debounced auto-scroll coordination.
//!
//! Fast speech produces highlight changes several times a second; scrolling
//! on every one would thrash the viewport. The coordinator keeps only the
//! latest pending target and releases at most one scroll per interval, so a
//! rapid stream of requests resolves to a smooth follow.
//!
//! Time is passed in explicitly rather than read from a global clock, which
//! keeps the coalescing logic testable.

use crate::index::ElementHandle;
use std::time::{Duration, Instant};

/// Coalesces scroll requests down to at most one per interval.
#[derive(Debug)]
pub struct ScrollCoordinator {
    interval: Duration,
    pending: Option<ElementHandle>,
    due: Option<Instant>,
}

impl ScrollCoordinator {
    /// Create a coordinator firing at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            due: None,
        }
    }

    /// Request a scroll to `target`.
    ///
    /// Replaces any pending target. The release deadline is set on the first
    /// request of a burst and left untouched by later ones, so a continuous
    /// stream still releases once per interval instead of starving.
    pub fn request(&mut self, target: ElementHandle, now: Instant) {
        self.pending = Some(target);
        if self.due.is_none() {
            self.due = Some(now + self.interval);
        }
    }

    /// Take the pending target if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ElementHandle> {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                self.pending.take()
            },
            _ => None,
        }
    }

    /// Drop any pending request. Called on stop and document replacement.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.due = None;
    }

    /// Whether a request is waiting to be released.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
