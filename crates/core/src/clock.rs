//! Time sources
//!
//! The "today" filter, overdue tags and notice expiry all read the clock
//! through this trait so they can be pinned in tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in the user's local time zone
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(DateTime<Utc>, NaiveDate)>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self {
            state: Mutex::new((now, today)),
        }
    }

    /// Pin the clock to the given local date, with `now` at the current instant
    pub fn on(today: NaiveDate) -> Self {
        Self::new(Utc::now(), today)
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.0 += by;
    }

    pub fn set_today(&self, today: NaiveDate) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.1 = today;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn today(&self) -> NaiveDate {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}
