//! Wall-clock helpers for turning "HH:MM" targets into scheduler delays

use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use std::sync::{Arc, Mutex};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Source of the current local time (allows a fixed clock in tests)
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// System clock (production)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parse an update time in 24 hour "HH:MM" form
pub fn parse_update_time(time: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|e| format!("Invalid update time '{}': expected HH:MM ({})", time, e))
}

/// Whole seconds from `now` until the next occurrence of `target`.
///
/// A target that has already passed today is scheduled for tomorrow. A
/// target equal to the current second gives 0.
pub fn seconds_until(target: NaiveTime, now: NaiveTime) -> i64 {
    let target = i64::from(target.num_seconds_from_midnight());
    let now = i64::from(now.num_seconds_from_midnight());
    (target - now).rem_euclid(SECONDS_PER_DAY)
}
