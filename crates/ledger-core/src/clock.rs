//! Time inputs for block and transaction construction.

use chrono::{DateTime, Utc};

pub const ISO8601_UTC: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Supplies block timestamps (epoch seconds) and transaction timestamps (ISO-8601 UTC).
pub trait TimeSource: Send + Sync {
    fn epoch_seconds(&self) -> u64;
    fn utc_iso8601(&self) -> String;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn epoch_seconds(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }

    fn utc_iso8601(&self) -> String {
        Utc::now().format(ISO8601_UTC).to_string()
    }
}

/// A clock frozen at one instant, for reproducible digests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// Returns `None` if `secs` is outside chrono's representable range.
    pub fn at_epoch(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(|at| Self { at })
    }
}

impl TimeSource for FixedClock {
    fn epoch_seconds(&self) -> u64 {
        self.at.timestamp().max(0) as u64
    }

    fn utc_iso8601(&self) -> String {
        self.at.format(ISO8601_UTC).to_string()
    }
}
