//! Calendar-time formatting shared between the JSON encoder and the
//! final-summary report.

use chrono::{DateTime, Utc};

/// Format `timestamp` (seconds since the Unix epoch) as
/// `YYYY-MM-DDTHH:MM:SS.ffffffZ`, matching the microsecond-precision
/// ISO-8601 UTC timestamp the JSON snapshot embeds.
///
/// Negative or out-of-range timestamps fall back to the epoch rather
/// than panicking — this is telemetry, not an input validator.
pub fn format_iso8601_utc(timestamp: f64) -> String {
    let secs = timestamp.floor() as i64;
    let micros = ((timestamp - timestamp.floor()) * 1_000_000.0).round() as u32;
    let (secs, micros) = if micros >= 1_000_000 { (secs + 1, 0) } else { (secs, micros) };
    let dt: DateTime<Utc> = DateTime::from_timestamp(secs, micros * 1_000)
        .unwrap_or_else(|| DateTime::from_timestamp(0, 0).expect("epoch is representable"));
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
