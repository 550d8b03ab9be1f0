#![forbid(unsafe_code)]

//! Monotonic session clock.
//!
//! The core takes time as a [`Duration`] since session start. In the browser
//! that comes from `performance.now()` via `web-time`; natively it is
//! `std::time::Instant`.

use core::cell::Cell;
use core::time::Duration;

use web_time::Instant;

/// Elapsed time since construction, never going backwards.
#[derive(Debug)]
pub struct HostClock {
    origin: Instant,
    last: Cell<Duration>,
}

impl HostClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last: Cell::new(Duration::ZERO),
        }
    }

    /// Current session time.
    pub fn now(&self) -> Duration {
        let now = self.origin.elapsed().max(self.last.get());
        self.last.set(now);
        now
    }

    /// Session time for a timer callback armed for `deadline`.
    ///
    /// Browsers may fire `setTimeout` a little early; a timer that fires
    /// must still observe its own deadline as reached.
    pub fn now_at_least(&self, deadline: Option<Duration>) -> Duration {
        let now = self.now();
        match deadline {
            Some(deadline) if deadline > now => {
                self.last.set(deadline);
                deadline
            }
            _ => now,
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}
