//! Coalescing of bursts of resize events.
//!
//! The coalescer never reads a clock. Callers pass monotonic timestamps
//! (any origin) and call [`Coalescer::poll`] when the reported deadline
//! passes, which keeps it usable from a browser event loop, a test, or a
//! native timer alike.

use std::time::Duration;

/// How rapid events are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coalesce {
    /// Every event runs.
    #[default]
    Immediate,
    /// Run once, `delay` after the last event of a burst.
    Debounce(Duration),
    /// Run at most once per `interval`, with one trailing run for events
    /// that arrived inside the window.
    Throttle(Duration),
}

/// What to do with an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    RunNow,
    /// A run is pending at this time.
    Scheduled(Duration),
}

#[derive(Debug, Clone, Default)]
pub struct Coalescer {
    mode: Coalesce,
    pending: Option<Duration>,
    window_end: Option<Duration>,
}

impl Coalescer {
    pub fn new(mode: Coalesce) -> Self {
        Self {
            mode,
            pending: None,
            window_end: None,
        }
    }

    pub fn mode(&self) -> Coalesce {
        self.mode
    }

    pub fn event(&mut self, now: Duration) -> Decision {
        match self.mode {
            Coalesce::Immediate => Decision::RunNow,
            Coalesce::Debounce(delay) => {
                let due = now + delay;
                self.pending = Some(due);
                Decision::Scheduled(due)
            }
            Coalesce::Throttle(interval) => match self.window_end {
                Some(end) if now < end => {
                    self.pending = Some(end);
                    Decision::Scheduled(end)
                }
                _ => {
                    self.window_end = Some(now + interval);
                    self.pending = None;
                    Decision::RunNow
                }
            },
        }
    }

    /// Returns true (once) when the pending run is due.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.pending {
            Some(due) if now >= due => {
                self.pending = None;
                if let Coalesce::Throttle(interval) = self.mode {
                    // The trailing run opens the next window.
                    self.window_end = Some(now + interval);
                }
                true
            }
            _ => false,
        }
    }

    /// When the pending run is due, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
