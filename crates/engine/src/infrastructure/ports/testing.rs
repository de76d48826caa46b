// Port traits define the full contract - many methods are for future use
#![allow(dead_code)]

//! Testability port for injecting time.

use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
