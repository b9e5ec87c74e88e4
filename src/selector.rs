//! src/selector.rs
//!
//! The neighbour selector. Returns a uniformly random peer from the
//! node's peer list, excluding self and any peer the filter mask rejects.
//! The eligible set is computed up front, so an empty result is detected
//! directly rather than by looping forever against rejection sampling.

use crate::domain::{PeerAddr, PeerSet};
use crate::sim::rng::Rng;

/// Picks a peer uniformly at random from `peers`, excluding `own` and any
/// peer for which `filter` returns `false`. Returns `None` when the eligible
/// set is empty.
pub fn select_peer(
    peers: &PeerSet,
    own: PeerAddr,
    filter: impl Fn(&PeerAddr) -> bool,
    rng: &mut dyn Rng,
) -> Option<PeerAddr> {
    let eligible: Vec<&PeerAddr> = peers.iter_excluding(own).filter(|p| filter(p)).collect();
    if eligible.is_empty() {
        return None;
    }
    let index = rng.uniform_integer(0, eligible.len() as u32) as usize;
    Some(*eligible[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SimRng;

    fn addr(port: u16) -> PeerAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn never_selects_self() {
        let peers = PeerSet::new(vec![addr(1), addr(2), addr(3)]);
        let mut rng = SimRng::seeded(7);
        for _ in 0..200 {
            let picked = select_peer(&peers, addr(2), |_| true, &mut rng).unwrap();
            assert_ne!(picked, addr(2));
        }
    }

    #[test]
    fn empty_eligible_set_returns_none() {
        let peers = PeerSet::new(vec![addr(1)]);
        let mut rng = SimRng::seeded(1);
        assert_eq!(select_peer(&peers, addr(1), |_| true, &mut rng), None);
    }

    #[test]
    fn filter_excludes_inactive_connectivity() {
        let peers = PeerSet::new(vec![addr(1), addr(2), addr(3)]);
        let mut rng = SimRng::seeded(3);
        for _ in 0..50 {
            let picked = select_peer(&peers, addr(1), |p| *p == addr(2), &mut rng).unwrap();
            assert_eq!(picked, addr(2));
        }
    }

    #[test]
    fn empty_filtered_set_returns_none() {
        let peers = PeerSet::new(vec![addr(1), addr(2)]);
        let mut rng = SimRng::seeded(5);
        assert_eq!(select_peer(&peers, addr(1), |_| false, &mut rng), None);
    }
}
