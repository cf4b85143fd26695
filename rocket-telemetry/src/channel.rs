//! A bounded, closable, multi-producer/single-consumer channel of
//! `SensorSample`s.
//!
//! This is the direct idiomatic-Rust transliteration of
//! `rocket_c/src/message_queue.c`: one `Mutex`-guarded ring buffer plus
//! two `Condvar`s (one for "became non-empty", one for "became
//! non-full"). `std::sync::mpsc` isn't a fit here — it has no bounded
//! variant whose `send` blocks with "return false, no partial write" on
//! close, and no shared receiver with a timed pop that every producer's
//! `close()` can wake.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use telemetry_types::SensorSample;

struct Inner {
    buffer: VecDeque<SensorSample>,
    capacity: usize,
    closed: bool,
}

/// A bounded ring buffer of `SensorSample`, capacity fixed at
/// construction. Safe to share across threads behind an `Arc`.
pub struct SensorChannel {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl SensorChannel {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { 32 } else { capacity };
        Self {
            inner: Mutex::new(Inner {
                buffer: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Blocks while the channel is open and full. Returns `false`
    /// without writing the sample if the channel is (or becomes)
    /// closed before room is available.
    pub fn push(&self, sample: SensorSample) -> bool {
        let mut guard = self.inner.lock().unwrap();
        while !guard.closed && guard.buffer.len() == guard.capacity {
            guard = self.not_full.wait(guard).unwrap();
        }
        if guard.closed {
            return false;
        }
        guard.buffer.push_back(sample);
        self.not_empty.notify_one();
        true
    }

    /// `timeout_seconds < 0` blocks until a sample is available or the
    /// channel closes. Otherwise waits up to that many seconds past
    /// now. Returns `None` on timeout or on "closed and drained".
    ///
    /// The deadline is computed from `Instant`, not wall-clock time —
    /// a clock step during the wait can't stampede or suppress the
    /// aggregator's timeout (see the Open Question in spec §9).
    pub fn pop(&self, timeout_seconds: f64) -> Option<SensorSample> {
        let mut guard = self.inner.lock().unwrap();
        if timeout_seconds < 0.0 {
            while !guard.closed && guard.buffer.is_empty() {
                guard = self.not_empty.wait(guard).unwrap();
            }
        } else {
            let deadline = Instant::now() + Duration::from_secs_f64(timeout_seconds.max(0.0));
            while !guard.closed && guard.buffer.is_empty() {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let (next_guard, result) =
                    self.not_empty.wait_timeout(guard, deadline - now).unwrap();
                guard = next_guard;
                if result.timed_out() && guard.buffer.is_empty() {
                    break;
                }
            }
        }

        if guard.buffer.is_empty() {
            return None;
        }
        let sample = guard.buffer.pop_front();
        self.not_full.notify_one();
        sample
    }

    /// Idempotently marks the channel closed and wakes every waiter,
    /// producer and consumer alike. Subsequent `push` returns `false`
    /// immediately; subsequent `pop` drains whatever remains, then
    /// returns `None`.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use telemetry_types::{ImuFrame, SensorSample};

    fn sample(ts: f64) -> SensorSample {
        SensorSample::imu(ts, ImuFrame {
            ax: 0.0, ay: 0.0, az: 1.0, gx: 0.0, gy: 0.0, gz: 0.0,
            pitch: 0.0, roll: 0.0, yaw: 0.0, dummy: true,
        })
    }

    // S1 from spec §8: capacity=2, push(A), push(B), pop->A, close(),
    // push(C)->false, pop->B, pop->false.
    #[test]
    fn s1_fifo_and_close() {
        let ch = SensorChannel::new(2);
        assert!(ch.push(sample(1.0)));
        assert!(ch.push(sample(2.0)));
        assert_eq!(ch.pop(-1.0).unwrap().timestamp, 1.0);
        ch.close();
        assert!(!ch.push(sample(3.0)));
        assert_eq!(ch.pop(-1.0).unwrap().timestamp, 2.0);
        assert!(ch.pop(-1.0).is_none());
    }

    #[test]
    fn pop_times_out_on_empty_open_channel() {
        let ch = SensorChannel::new(4);
        let start = Instant::now();
        assert!(ch.pop(0.05).is_none());
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn close_wakes_a_blocked_pop_immediately() {
        let ch = Arc::new(SensorChannel::new(4));
        let ch2 = ch.clone();
        let handle = std::thread::spawn(move || ch2.pop(5.0));
        std::thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        ch.close();
        let result = handle.join().unwrap();
        assert!(result.is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn close_wakes_a_blocked_push_immediately() {
        let ch = Arc::new(SensorChannel::new(1));
        assert!(ch.push(sample(0.0)));
        let ch2 = ch.clone();
        let handle = std::thread::spawn(move || ch2.push(sample(1.0)));
        std::thread::sleep(Duration::from_millis(20));
        ch.close();
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn single_producer_fifo_order_preserved() {
        let ch = SensorChannel::new(8);
        for i in 0..5 {
            assert!(ch.push(sample(i as f64)));
        }
        for i in 0..5 {
            assert_eq!(ch.pop(-1.0).unwrap().timestamp, i as f64);
        }
    }
}
