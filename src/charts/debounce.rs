//! Resize debouncing
//!
//! A single pending deadline: every new event replaces the pending one, so a
//! burst of resizes produces one relayout after the burst goes quiet.

use std::time::{Duration, Instant};

/// Quiet period before a resize is applied.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Cancel any pending value and arm the timer for `value`.
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Time left before the pending value fires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
    }
}
