use chrono::{DateTime, Utc};

/// Source of the current time. Abstracted so expiry validation and
/// renewal-date math are deterministic under test.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg(test)]
mockall::mock! {
    pub Clock {}

    impl ClockPort for Clock {
        fn now(&self) -> DateTime<Utc>;
    }
}
