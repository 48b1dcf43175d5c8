//! Wall-clock plumbing.
//!
//! Services take a [`SharedClock`] at construction instead of calling
//! `Utc::now()` so token expiry and house watermarks can be driven in tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use parking_lot::Mutex;

/// Clock handle shared between services.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// The real system clock.
pub fn system_clock() -> SharedClock {
    Arc::new(mockable::DefaultClock)
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    /// Starts at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.0.lock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}
