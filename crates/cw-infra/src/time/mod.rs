use chrono::{DateTime, Utc};

use cw_core::ports::ClockPort;

/// Wall-clock time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
