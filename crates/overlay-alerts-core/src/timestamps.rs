//! Timestamp conversion utilities.
//!
//! All timestamps are stored as `i64` (microseconds since Unix epoch). This
//! module provides conversion to/from chrono types, plus monotonic protection
//! against backward wall-clock jumps (NTP corrections, VM migration, etc.):
//! [`now_micros`] tracks the last observed value and never regresses.

use chrono::{NaiveDateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds per second
const MICROS_PER_SECOND: i64 = 1_000_000;

/// Last observed wall-clock value (microseconds since epoch).
static LAST_SYSTEM_TIME_US: AtomicI64 = AtomicI64::new(0);

/// Convert chrono `NaiveDateTime` to microseconds since Unix epoch.
#[inline]
#[must_use]
pub fn naive_to_micros(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_micros()
}

/// Convert microseconds since Unix epoch to chrono `NaiveDateTime`.
///
/// For extreme values outside chrono's representable range, clamps to the
/// nearest representable bound instead of panicking.
#[inline]
#[must_use]
pub fn micros_to_naive(micros: i64) -> NaiveDateTime {
    let secs = micros.div_euclid(MICROS_PER_SECOND);
    let sub_micros = micros.rem_euclid(MICROS_PER_SECOND);
    let nsecs = u32::try_from(sub_micros * 1000).unwrap_or(0);
    Utc.timestamp_opt(secs, nsecs)
        .single()
        .unwrap_or(if micros < 0 {
            chrono::DateTime::<Utc>::MIN_UTC
        } else {
            chrono::DateTime::<Utc>::MAX_UTC
        })
        .naive_utc()
}

/// Current time as microseconds since Unix epoch, monotonically guarded.
///
/// On a backward wall-clock jump the previously observed value wins, so
/// stored `created_at` ordering never regresses within a process.
#[must_use]
pub fn now_micros() -> i64 {
    let raw = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
        .unwrap_or(0);

    let mut last = LAST_SYSTEM_TIME_US.load(Ordering::Relaxed);
    loop {
        let next = raw.max(last);
        match LAST_SYSTEM_TIME_US.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_microseconds() {
        let micros = 1_700_000_123_456_789_i64;
        assert_eq!(naive_to_micros(micros_to_naive(micros)), micros);
    }

    #[test]
    fn negative_micros_do_not_panic() {
        let _ = micros_to_naive(-1);
        let _ = micros_to_naive(i64::MIN);
        let _ = micros_to_naive(i64::MAX);
    }

    #[test]
    fn now_micros_is_monotonic_across_calls() {
        let a = now_micros();
        let b = now_micros();
        assert!(b >= a);
    }
}
