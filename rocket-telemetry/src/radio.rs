//! Packet-radio transport: fragmentation, framing, and the
//! polymorphic driver seam, ported from `rocket_c/src/lora_transport.c`.
//!
//! The aggregator only ever sees "payload in, bool out" (§9's "radio
//! transport as a polymorphic sink"), so it stays testable against an
//! in-memory capture driver without any real hardware.

use crate::logsink;

const MTU: usize = 200;
const TOPIC: &str = "sensors";
const MAX_TOPIC_LEN: usize = 15;

/// The capability a real radio library would provide: initialize once,
/// then send raw bytes, both fallibly.
pub trait RadioDriver: Send {
    fn init(&mut self, channel: u8, freq_hz: u32, spreading_factor: u8) -> bool;
    fn send(&mut self, bytes: &[u8]) -> bool;
}

/// Stand-in for an absent radio library: `init` reports success is
/// never claimed (so the transport treats it as "not ready"), and
/// `send` is never reached once `ready` is false. Kept around so the
/// transport has a safe default driver even when no real one is wired
/// in — matching the no-radio-library build of the C original, where
/// the transport degrades to a no-op that still returns success.
pub struct NullRadioDriver;

impl RadioDriver for NullRadioDriver {
    fn init(&mut self, _channel: u8, _freq_hz: u32, _spreading_factor: u8) -> bool {
        false
    }

    fn send(&mut self, _bytes: &[u8]) -> bool {
        true
    }
}

/// Stateful transmitter: fragments a JSON payload into framed packets
/// and hands each to the underlying `RadioDriver`.
pub struct RadioTransport {
    driver: Box<dyn RadioDriver>,
    ready: bool,
    topic: String,
}

impl RadioTransport {
    /// Initializes the transport against `driver` with the given radio
    /// parameters. `ready` is `true` only if `driver.init` reports
    /// success.
    pub fn new(mut driver: Box<dyn RadioDriver>, channel: u8, freq_hz: u32, spreading_factor: u8) -> Self {
        let ready = driver.init(channel, freq_hz, spreading_factor);
        let topic = if TOPIC.len() > MAX_TOPIC_LEN { TOPIC[..MAX_TOPIC_LEN].to_string() } else { TOPIC.to_string() };
        if !ready {
            logsink::log_warn("RADIO", "radio driver unavailable, transport degraded to no-op");
        }
        Self { driver, ready, topic }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Sends `payload`, fragmented per §4.6. A logged no-op returning
    /// `true` when the transport isn't ready. Returns `false` on the
    /// first frame the driver rejects, without sending the rest.
    pub fn send(&mut self, payload: &str) -> bool {
        if !self.ready {
            return true;
        }

        let payload = payload.as_bytes();
        let header_len = 1 + 1 + self.topic.len() + 1 + 1;
        let room = (MTU.saturating_sub(header_len)).max(1);
        let total_frames = if payload.is_empty() {
            1
        } else {
            payload.len().div_ceil(room)
        };

        for index in 1..=total_frames {
            let start = (index - 1) * room;
            let end = (index * room).min(payload.len());
            let slice = if start < payload.len() { &payload[start..end] } else { &[] };

            let mut frame = Vec::with_capacity(header_len + slice.len());
            frame.push(b'J');
            frame.push(self.topic.len() as u8);
            frame.extend_from_slice(self.topic.as_bytes());
            frame.push((index & 0xFF) as u8);
            frame.push((total_frames & 0xFF) as u8);
            frame.extend_from_slice(slice);

            if !self.driver.send(&frame) {
                logsink::log_error("RADIO", &format!("frame {index}/{total_frames} send failed"));
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct CaptureDriver {
        ready: bool,
        frames: Arc<Mutex<Vec<Vec<u8>>>>,
        fail_on: Option<usize>,
    }

    impl RadioDriver for CaptureDriver {
        fn init(&mut self, _channel: u8, _freq_hz: u32, _spreading_factor: u8) -> bool {
            self.ready
        }

        fn send(&mut self, bytes: &[u8]) -> bool {
            let mut frames = self.frames.lock().unwrap();
            frames.push(bytes.to_vec());
            match self.fail_on {
                Some(n) if frames.len() == n => false,
                _ => true,
            }
        }
    }

    #[test]
    fn not_ready_driver_degrades_to_a_successful_no_op() {
        let driver = Box::new(NullRadioDriver);
        let mut transport = RadioTransport::new(driver, 0, 433_000_000, 7);
        assert!(!transport.is_ready());
        assert!(transport.send("{}"));
    }

    // S6 from spec §8: payload length 500, topic "sensors" (7 bytes), MTU 200.
    #[test]
    fn s6_fragmentation_math() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let driver = Box::new(CaptureDriver { ready: true, frames: frames.clone(), fail_on: None });
        let mut transport = RadioTransport::new(driver, 0, 433_000_000, 7);
        assert!(transport.is_ready());

        let payload: String = std::iter::repeat('x').take(500).collect();
        assert!(transport.send(&payload));

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 3);

        let header_len = 1 + 1 + "sensors".len() + 1 + 1;
        assert_eq!(header_len, 10);
        let room = MTU - header_len;
        assert_eq!(room, 190);

        assert_eq!(frames[0][0], b'J');
        assert_eq!(frames[0][1], 7);
        assert_eq!(&frames[0][2..9], b"sensors");
        assert_eq!(frames[0][9], 1);
        assert_eq!(frames[0][10], 3);
        assert_eq!(frames[0].len() - header_len, 190);

        assert_eq!(frames[1][9], 2);
        assert_eq!(frames[1].len() - header_len, 190);

        assert_eq!(frames[2][9], 3);
        assert_eq!(frames[2].len() - header_len, 120);
    }

    #[test]
    fn a_failed_frame_stops_the_send_and_reports_false() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let driver = Box::new(CaptureDriver { ready: true, frames: frames.clone(), fail_on: Some(2) });
        let mut transport = RadioTransport::new(driver, 0, 433_000_000, 7);

        let payload: String = std::iter::repeat('x').take(500).collect();
        assert!(!transport.send(&payload));
        assert_eq!(frames.lock().unwrap().len(), 2);
    }

    #[test]
    fn single_frame_for_small_payloads() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let driver = Box::new(CaptureDriver { ready: true, frames: frames.clone(), fail_on: None });
        let mut transport = RadioTransport::new(driver, 0, 433_000_000, 7);
        assert!(transport.send("{}"));
        assert_eq!(frames.lock().unwrap().len(), 1);
    }
}
