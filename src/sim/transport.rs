//! src/sim/transport.rs
//!
//! The datagram transport contract the core requires of its host (//! "best-effort, unordered, may duplicate or drop"). The core never talks
//! to a socket; it hands the `Runtime` a payload and a destination, and
//! the `Transport` decides whether and when it arrives.

use crate::domain::{PeerAddr, SimTime};
use crate::sim::rng::Rng;

pub trait Transport {
    /// Simulates handing `payload` to the network. Returns the propagation
    /// delay to apply before delivery, or `None` if the datagram is lost.
    fn transmit(&mut self, from: PeerAddr, to: PeerAddr, rng: &mut dyn Rng) -> Option<SimTime>;
}

/// A transport with a fixed propagation delay and independent per-datagram
/// loss probability — enough to exercise the retry/timeout paths without
/// modelling a real link.
pub struct LossyTransport {
    pub propagation_delay: SimTime,
    pub loss_probability: f64,
}

impl LossyTransport {
    pub fn reliable(propagation_delay: SimTime) -> Self {
        Self { propagation_delay, loss_probability: 0.0 }
    }

    pub fn new(propagation_delay: SimTime, loss_probability: f64) -> Self {
        assert!((0.0..=1.0).contains(&loss_probability), "loss_probability must be a fraction");
        Self { propagation_delay, loss_probability }
    }
}

impl Default for LossyTransport {
    fn default() -> Self {
        Self::reliable(0.01)
    }
}

const LOSS_RESOLUTION: u32 = 1_000_000;

impl Transport for LossyTransport {
    fn transmit(&mut self, _from: PeerAddr, _to: PeerAddr, rng: &mut dyn Rng) -> Option<SimTime> {
        if self.loss_probability <= 0.0 {
            return Some(self.propagation_delay);
        }
        let roll = rng.uniform_integer(0, LOSS_RESOLUTION);
        let threshold = (self.loss_probability * LOSS_RESOLUTION as f64) as u32;
        if roll < threshold {
            None
        } else {
            Some(self.propagation_delay)
        }
    }
}
