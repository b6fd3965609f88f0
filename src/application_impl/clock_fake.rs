use crate::domain_port::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut lock) = self.now.lock() {
            *lock = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut lock) = self.now.lock() {
            *lock += by;
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(lock) => *lock,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
