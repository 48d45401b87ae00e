use chrono::{DateTime, Utc};

/// Current-time source injected into the scan engine and auth layer.
///
/// Production uses [`SystemClock`]; tests supply a fixed clock so quota
/// day-boundary behavior can be verified deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
