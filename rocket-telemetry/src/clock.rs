//! Wall time in seconds and a bounded sleep, mirroring
//! `rocket_c/src/util.c`'s `current_time_seconds`/`sleep_seconds`.
//!
//! ISO-8601 formatting itself lives in `telemetry_types::time` since it
//! operates on a timestamp value, not the live clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time as seconds since the Unix epoch.
///
/// Used for sample timestamps and for the JSON snapshot's
/// `reported_at` — these must be real calendar time, unlike the
/// channel's pop-timeout deadline, which uses `Instant` instead (see
/// `channel.rs`) to stay immune to clock adjustments.
pub fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}

/// Sleep for `seconds`, clamped to a no-op for non-positive durations.
pub fn sleep_seconds(seconds: f64) {
    if seconds > 0.0 {
        std::thread::sleep(Duration::from_secs_f64(seconds));
    }
}
