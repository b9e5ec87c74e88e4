//! src/domain.rs
//!
//! Shared, variant-independent data structures. This is the single source
//! of truth for how a node is addressed and how simulated time is
//! represented, so the codec, selector, and all three node state machines
//! agree on the same vocabulary.

use std::net::SocketAddr;

/// A node's network identity. The simulated transport keys everything off
/// this, exactly as a real UDP transport would key connections off a
/// `SocketAddr`.
pub type PeerAddr = SocketAddr;

/// Simulated time, in seconds since the run started (`Simulator::Now()` in
/// the original design). Never wall-clock.
pub type SimTime = f64;

/// A monotonically non-decreasing epoch number (`MultiphaseVarGossip` only).
pub type Epoch = u32;

/// The ordered, fixed neighbour set a node was started with. Includes the
/// node's own address; the neighbour selector is responsible for excluding
/// self (invariant I5).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeerSet(pub Vec<PeerAddr>);

impl PeerSet {
    pub fn new(peers: Vec<PeerAddr>) -> Self {
        Self(peers)
    }

    pub fn as_slice(&self) -> &[PeerAddr] {
        &self.0
    }

    pub fn iter_excluding<'a>(&'a self, own: PeerAddr) -> impl Iterator<Item = &'a PeerAddr> {
        self.0.iter().filter(move |p| **p != own)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> PeerAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn iter_excluding_skips_self() {
        let set = PeerSet::new(vec![addr(1), addr(2), addr(3)]);
        let rest: Vec<_> = set.iter_excluding(addr(2)).copied().collect();
        assert_eq!(rest, vec![addr(1), addr(3)]);
    }
}
