use chrono::{DateTime, Utc};

/// Source of the current time for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-utils"))]
mod manual {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, TimeDelta, Utc};

    use super::Clock;

    /// Clock that only moves when told to
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        #[must_use]
        pub const fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        /// Moves the clock forward by `by`
        ///
        /// # Panics
        ///
        /// Panics if the lock is poisoned or `by` overflows the clock
        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += TimeDelta::from_std(by).unwrap();
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use manual::ManualClock;
