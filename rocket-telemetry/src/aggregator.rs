//! The aggregator: single consumer of the sensor channel, latest-state
//! fusion, liftoff detection, and paced snapshot emission, ported from
//! `rocket_c/src/aggregator.c`.

use std::sync::Arc;

use telemetry_types::{SensorId, SensorSample};

use crate::activity::{ActivityTracker, ZeroSignal};
use crate::channel::SensorChannel;
use crate::clock;
use crate::json;
use crate::logsink;
use crate::radio::RadioTransport;

/// Liftoff / zero-acceleration detector constants (§4.4.1).
const REF_G: f64 = 1.0;
const TOLERANCE_G: f64 = 0.05;
const REQUIRED_DETECTIONS: u32 = 2;
const MIN_DELAY_SECONDS: f64 = 1.0;

/// How long the aggregator blocks on an empty channel before
/// rechecking the stop flag (§4.4 step 1).
const POP_TIMEOUT_SECONDS: f64 = 0.2;

struct LiftoffDetector {
    zero_acc_count: u32,
    zero_last_detection: f64,
}

impl LiftoffDetector {
    fn new() -> Self {
        Self { zero_acc_count: 0, zero_last_detection: f64::NEG_INFINITY }
    }

    /// Feeds one non-dummy IMU sample through the detector. A no-op if
    /// `latch` has already tripped.
    fn observe(&mut self, sample: &SensorSample, latch: &ZeroSignal) {
        if latch.is_sent() {
            return;
        }
        let frame = match sample.as_imu() {
            Some(f) => f,
            None => return,
        };
        let magnitude = frame.accel_magnitude();
        let within_tolerance = (magnitude - REF_G).abs() <= TOLERANCE_G;
        let past_min_delay = sample.timestamp - self.zero_last_detection > MIN_DELAY_SECONDS;

        if within_tolerance && past_min_delay {
            self.zero_acc_count += 1;
            self.zero_last_detection = sample.timestamp;
            logsink::log_info(
                "AGGREGATOR",
                &format!("zero-acceleration detection #{} magnitude={magnitude:.4}g", self.zero_acc_count),
            );

            if self.zero_acc_count >= REQUIRED_DETECTIONS
                && latch.record(sample.timestamp, magnitude)
            {
                logsink::log_warn(
                    "AGGREGATOR",
                    &format!("liftoff signal latched at t={:.3} magnitude={magnitude:.4}g", sample.timestamp),
                );
            }
        }
    }
}

/// Per-sensor latest sample plus the derived state the aggregator
/// loop carries between iterations.
pub struct Aggregator {
    channel: Arc<SensorChannel>,
    activity: Arc<ActivityTracker>,
    zero_signal: Arc<ZeroSignal>,
    radio: Option<RadioTransport>,
    emit_interval_seconds: f64,
    latest: [Option<SensorSample>; 3],
    detector: LiftoffDetector,
    last_emit: f64,
}

impl Aggregator {
    pub fn new(
        channel: Arc<SensorChannel>,
        activity: Arc<ActivityTracker>,
        zero_signal: Arc<ZeroSignal>,
        radio: Option<RadioTransport>,
        emit_interval_seconds: f64,
    ) -> Self {
        Self {
            channel,
            activity,
            zero_signal,
            radio,
            emit_interval_seconds,
            latest: [None, None, None],
            detector: LiftoffDetector::new(),
            last_emit: 0.0,
        }
    }

    fn slot_index(id: SensorId) -> usize {
        SensorId::ALL.iter().position(|&s| s == id).expect("SensorId::ALL covers every id")
    }

    /// Runs the consume loop until the channel closes and drains —
    /// the channel's close is the authoritative shutdown wake (§5).
    pub fn run(&mut self) {
        loop {
            let sample = match self.channel.pop(POP_TIMEOUT_SECONDS) {
                Some(sample) => sample,
                None => {
                    if self.channel.is_closed() {
                        break;
                    }
                    continue;
                }
            };

            self.ingest(sample);
        }
    }

    fn ingest(&mut self, sample: SensorSample) {
        self.activity.update(sample.sensor_id, sample.dummy());

        if sample.sensor_id == SensorId::Imu && !sample.dummy() {
            self.detector.observe(&sample, &self.zero_signal);
        }

        let index = Self::slot_index(sample.sensor_id);
        self.latest[index] = Some(sample);

        let now = clock::now_seconds();
        if now - self.last_emit < self.emit_interval_seconds {
            return;
        }
        self.emit(now);
        self.last_emit = now;
    }

    fn emit(&mut self, now: f64) {
        let json = json::encode_snapshot(now, &self.latest);
        logsink::log_payload("AGGREGATOR", &json);

        if let Some(radio) = &mut self.radio {
            if !radio.send(&json) {
                logsink::log_error("AGGREGATOR", "radio transport failed to send snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_types::ImuFrame;

    fn imu_sample(timestamp: f64, az: f64, dummy: bool) -> SensorSample {
        SensorSample::imu(timestamp, ImuFrame {
            ax: 0.0, ay: 0.0, az, gx: 0.0, gy: 0.0, gz: 0.0,
            pitch: 0.0, roll: 0.0, yaw: 0.0, dummy,
        })
    }

    // S2 from spec §8.
    #[test]
    fn s2_liftoff_latch_trips_on_second_detection_and_does_not_overwrite() {
        let latch = ZeroSignal::new();
        let mut detector = LiftoffDetector::new();

        detector.observe(&imu_sample(10.0, 1.0, false), &latch);
        assert!(!latch.is_sent());
        assert_eq!(detector.zero_acc_count, 1);

        detector.observe(&imu_sample(11.5, 1.0, false), &latch);
        assert!(latch.is_sent());
        let (ts, mag) = latch.details().unwrap();
        assert_eq!(ts, 11.5);
        assert_eq!(mag, 1.0);

        detector.observe(&imu_sample(13.0, 1.0, false), &latch);
        let (ts, _) = latch.details().unwrap();
        assert_eq!(ts, 11.5);
    }

    // S3 from spec §8.
    #[test]
    fn s3_dummy_samples_never_trip_the_latch() {
        let latch = ZeroSignal::new();
        let mut detector = LiftoffDetector::new();
        for t in [10.0, 11.5, 13.0] {
            detector.observe(&imu_sample(t, 1.0, true), &latch);
        }
        assert!(!latch.is_sent());
        assert_eq!(detector.zero_acc_count, 0);
    }

    // S4 from spec §8.
    #[test]
    fn s4_out_of_tolerance_magnitude_never_increments_the_counter() {
        let latch = ZeroSignal::new();
        let mut detector = LiftoffDetector::new();
        for t in [10.0, 11.5, 13.0] {
            detector.observe(&imu_sample(t, 0.9, false), &latch);
        }
        assert!(!latch.is_sent());
        assert_eq!(detector.zero_acc_count, 0);
    }

    #[test]
    fn detections_within_min_delay_do_not_increment_the_counter() {
        let latch = ZeroSignal::new();
        let mut detector = LiftoffDetector::new();
        detector.observe(&imu_sample(10.0, 1.0, false), &latch);
        detector.observe(&imu_sample(10.5, 1.0, false), &latch);
        assert_eq!(detector.zero_acc_count, 1);
        assert!(!latch.is_sent());
    }

    #[test]
    fn ingest_updates_activity_tracker_and_latest_state() {
        let channel = Arc::new(SensorChannel::new(4));
        let activity = Arc::new(ActivityTracker::new());
        let zero_signal = Arc::new(ZeroSignal::new());
        let mut aggregator = Aggregator::new(channel, activity.clone(), zero_signal, None, 0.5);

        aggregator.ingest(imu_sample(1.0, 1.0, false));
        assert!(activity.seen(SensorId::Imu));
        assert!(!activity.last_dummy(SensorId::Imu));
        assert!(aggregator.latest[0].is_some());
    }
}
