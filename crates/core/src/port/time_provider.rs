// Clock Port (for testability)

use chrono::NaiveDateTime;

/// Clock interface (allows fixed time in tests)
pub trait Clock: Send + Sync {
    /// Current local wall-clock time, used to stamp match results
    fn now_local(&self) -> NaiveDateTime;
}

/// System clock (production)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Clock frozen at a given instant, movable by tests
    pub struct FixedClock {
        now: Mutex<NaiveDateTime>,
    }

    impl FixedClock {
        pub fn new(now: NaiveDateTime) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        /// Clock at 2024-01-01 10:00
        pub fn new_default() -> Self {
            let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .expect("valid fixed date");
            Self::new(now)
        }

        pub fn set(&self, now: NaiveDateTime) {
            *self.now.lock().unwrap() = now;
        }
    }

    impl Clock for FixedClock {
        fn now_local(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }
    }
}
