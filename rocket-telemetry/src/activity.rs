//! Per-sensor activity bookkeeping and the zero-acceleration ("liftoff")
//! latch, ported from `rocket_c/src/activity_tracker.c`.
//!
//! The C original keeps these as two flat arrays guarded by one mutex.
//! Here each sensor gets its own `AtomicBool`/`AtomicU64` pair so the
//! aggregator thread (the only writer) never contends with whichever
//! worker thread is merely publishing a capability bit elsewhere (see
//! `caps.rs`) — `ActivityTracker` itself is still single-writer,
//! single-reader-per-field, so plain atomics are enough without a mutex.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use telemetry_types::SensorId;

#[derive(Default)]
struct SensorActivity {
    seen: AtomicBool,
    last_dummy: AtomicBool,
}

/// Tracks, per sensor, whether any sample has arrived yet and whether
/// the most recent one was a dummy/simulated reading.
pub struct ActivityTracker {
    imu: SensorActivity,
    baro: SensorActivity,
    gps: SensorActivity,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self {
            imu: SensorActivity::default(),
            baro: SensorActivity::default(),
            gps: SensorActivity::default(),
        }
    }

    fn slot(&self, id: SensorId) -> &SensorActivity {
        match id {
            SensorId::Imu => &self.imu,
            SensorId::Baro => &self.baro,
            SensorId::Gps => &self.gps,
        }
    }

    /// Records that a sample for `id` arrived, and whether it was a
    /// dummy reading.
    pub fn update(&self, id: SensorId, dummy: bool) {
        let slot = self.slot(id);
        slot.seen.store(true, Ordering::Relaxed);
        slot.last_dummy.store(dummy, Ordering::Relaxed);
    }

    pub fn seen(&self, id: SensorId) -> bool {
        self.slot(id).seen.load(Ordering::Relaxed)
    }

    pub fn last_dummy(&self, id: SensorId) -> bool {
        self.slot(id).last_dummy.load(Ordering::Relaxed)
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Write-once latch for the zero-acceleration / liftoff event (spec
/// §4.2, §8.4). Once tripped it never resets for the life of the
/// process — a second, later detection is a silent no-op, matching
/// `activity_tracker_record_zero_signal`'s "if already sent, do
/// nothing" behavior in the C original.
#[derive(Default)]
pub struct ZeroSignal {
    sent: AtomicBool,
    timestamp_bits: AtomicU64,
    magnitude_bits: AtomicU64,
}

impl ZeroSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to trip the latch. Returns `true` only the first time
    /// it is called; every subsequent call is a no-op returning
    /// `false`, regardless of the values passed.
    pub fn record(&self, timestamp: f64, magnitude: f64) -> bool {
        if self
            .sent
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.timestamp_bits.store(timestamp.to_bits(), Ordering::Release);
        self.magnitude_bits.store(magnitude.to_bits(), Ordering::Release);
        true
    }

    pub fn is_sent(&self) -> bool {
        self.sent.load(Ordering::Acquire)
    }

    /// Returns `(timestamp, magnitude)` of the recorded event, or
    /// `None` if the latch has never tripped.
    pub fn details(&self) -> Option<(f64, f64)> {
        if !self.is_sent() {
            return None;
        }
        Some((
            f64::from_bits(self.timestamp_bits.load(Ordering::Acquire)),
            f64::from_bits(self.magnitude_bits.load(Ordering::Acquire)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_has_seen_nothing() {
        let tracker = ActivityTracker::new();
        for id in SensorId::ALL {
            assert!(!tracker.seen(id));
            assert!(!tracker.last_dummy(id));
        }
    }

    #[test]
    fn update_is_tracked_independently_per_sensor() {
        let tracker = ActivityTracker::new();
        tracker.update(SensorId::Imu, false);
        tracker.update(SensorId::Baro, true);
        assert!(tracker.seen(SensorId::Imu));
        assert!(!tracker.last_dummy(SensorId::Imu));
        assert!(tracker.seen(SensorId::Baro));
        assert!(tracker.last_dummy(SensorId::Baro));
        assert!(!tracker.seen(SensorId::Gps));
    }

    #[test]
    fn later_update_overwrites_the_dummy_flag() {
        let tracker = ActivityTracker::new();
        tracker.update(SensorId::Gps, true);
        assert!(tracker.last_dummy(SensorId::Gps));
        tracker.update(SensorId::Gps, false);
        assert!(!tracker.last_dummy(SensorId::Gps));
    }

    #[test]
    fn zero_signal_latches_once() {
        let latch = ZeroSignal::new();
        assert!(latch.record(10.0, 0.2));
        assert!(!latch.record(99.0, 9.9));
        let (ts, mag) = latch.details().unwrap();
        assert_eq!(ts, 10.0);
        assert_eq!(mag, 0.2);
    }

    #[test]
    fn zero_signal_details_absent_before_first_record() {
        let latch = ZeroSignal::new();
        assert!(!latch.is_sent());
        assert!(latch.details().is_none());
    }
}
