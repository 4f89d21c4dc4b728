//! # Outbound Ports
//!
//! The ledgers (`pg_02_ledger::LedgerApi`) and the provisioner
//! (`pg_03_provisioner::Provisioner`) are consumed through their own
//! crates' traits. The clock is the one dependency defined here.

use chrono::{Duration, Utc};
use parking_lot::Mutex;
use shared_types::Timestamp;

/// Time source for request timestamps.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualTimeSource {
    time: Mutex<Timestamp>,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: Mutex::new(initial),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.time.lock() += by;
    }

    pub fn set(&self, time: Timestamp) {
        *self.time.lock() = time;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        *self.time.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_time_source() {
        let now = SystemTimeSource.now();
        assert!(now > Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_manual_time_source() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let source = ManualTimeSource::new(start);
        assert_eq!(source.now(), start);

        source.advance(Duration::seconds(90));
        assert_eq!(source.now(), start + Duration::seconds(90));

        source.set(start);
        assert_eq!(source.now(), start);
    }
}
