//! Artificial latency for exercising caller-side loading states.
//!
//! Real deployments sit behind a network; a fresh local store answers in
//! microseconds. The engine pauses for a random interval bounded by a
//! caller-supplied maximum before each operation, so front ends can be
//! tested against realistic latency. The bound is injected, never
//! ambient: tests use [`Delay::none`] and the pause can only affect
//! latency, not correctness.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delay {
    max: Duration,
}

impl Delay {
    /// No pause at all. The default for tests and embedded use.
    pub fn none() -> Self {
        Self {
            max: Duration::ZERO,
        }
    }

    /// Pause for a random interval in `[0, max)` before each operation.
    pub fn up_to(max: Duration) -> Self {
        Self { max }
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub(crate) fn pause(&self) {
        if self.max.is_zero() {
            return;
        }
        let bound = self.max.as_millis().max(1) as u64;
        let millis = rand::thread_rng().gen_range(0..bound);
        std::thread::sleep(Duration::from_millis(millis));
    }
}
