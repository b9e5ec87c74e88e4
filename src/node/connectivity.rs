//! src/node/connectivity.rs
//!
//! The variance-band connectivity test shared by VarGossip and
//! MultiphaseVarGossip. Resolves Open Question #2 as directed: the
//! band is tested against the node's own *global* variance estimate, not
//! a per-neighbour statistic.

use std::collections::HashMap;

use crate::domain::{PeerAddr, SimTime};
use crate::logging;

/// `true` when `own_m0` and `neighbour_m0` agree to within one global
/// standard deviation. A negative `variance` (numerical noise, P2) is
/// clamped to zero rather than producing `NaN` from `sqrt`.
pub fn decide(own_m0: f64, neighbour_m0: f64, variance: f64) -> bool {
    (own_m0 - neighbour_m0).abs() <= variance.max(0.0).sqrt()
}

/// Writes a freshly computed decision into `map`, logging a CHANGE event
/// whenever it differs from what was stored before — including the first
/// time a neighbour's decision becomes known — "unknown" is a distinct
/// prior state from `true`/`false`.
pub fn record_decision(
    map: &mut HashMap<PeerAddr, bool>,
    own: PeerAddr,
    neighbour: PeerAddr,
    new_decision: bool,
    now: SimTime,
) {
    let old_decision = map.insert(neighbour, new_decision);
    if old_decision != Some(new_decision) {
        logging::change(now, own, neighbour, old_decision, new_decision);
    }
}
