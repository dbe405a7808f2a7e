//! Rate limiting for window resize notifications.

use std::time::{Duration, Instant};

/// Leading-edge throttle: the first call in each interval fires, the rest
/// are dropped rather than queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Returns `true` if a call at `now` should run.
    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}

/// The registered resize handler. It is held for as long as the timeline is
/// mounted and released when dropped.
#[derive(Debug)]
pub struct ResizeListener {
    throttle: Throttle,
    dropped: u64,
}

impl ResizeListener {
    pub fn acquire(interval: Duration) -> Self {
        log::debug!("resize listener acquired, throttle {interval:?}");
        Self {
            throttle: Throttle::new(interval),
            dropped: 0,
        }
    }

    /// Returns `true` if this resize notification should be handled.
    pub fn notify(&mut self, now: Instant) -> bool {
        let admitted = self.throttle.admit(now);
        if !admitted {
            self.dropped += 1;
        }
        admitted
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        log::debug!(
            "resize listener released ({} notifications dropped)",
            self.dropped
        );
    }
}
