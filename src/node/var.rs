//! src/node/var.rs
//!
//! VarGossip: carries `w` and `w²` so each node can derive a variance
//! estimate, and maintains an always-on, unfiltered connectivity map
//! purely as observable output — it has no effect on peer selection.

use std::collections::HashMap;

use crate::codec::VarMsg;
use crate::config::VarGossipConfig;
use crate::domain::{PeerAddr, PeerSet, SimTime};
use crate::logging;
use crate::node::connectivity;
use crate::node::{Effect, EffectKind, LifecycleNode};
use crate::selector::select_peer;
use crate::sim::rng::Rng;

pub struct VarGossipNode {
    addr: PeerAddr,
    peers: PeerSet,
    interval: SimTime,
    initial_delay: SimTime,
    max_sends: u32,
    epsilon: f64,
    m0: f64,
    w: f64,
    w_old: f64,
    w2: f64,
    w2_old: f64,
    sent_count: u32,
    connectivity_map: HashMap<PeerAddr, bool>,
}

impl VarGossipNode {
    pub fn new(addr: PeerAddr, peers: PeerSet, initial_estimate: f64, config: &VarGossipConfig) -> Self {
        Self {
            addr,
            peers,
            interval: config.interval_secs,
            initial_delay: config.initial_delay_secs,
            max_sends: config.max_packets,
            epsilon: config.epsilon,
            m0: initial_estimate,
            w: initial_estimate,
            w_old: initial_estimate,
            w2: initial_estimate * initial_estimate,
            w2_old: initial_estimate * initial_estimate,
            sent_count: 0,
            connectivity_map: HashMap::new(),
        }
    }

    pub fn variance(&self) -> f64 {
        self.w2 - self.w * self.w
    }

    pub fn connectivity_map(&self) -> &HashMap<PeerAddr, bool> {
        &self.connectivity_map
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn sent_count(&self) -> u32 {
        self.sent_count
    }

    fn locally_converged(&self) -> bool {
        self.sent_count > 0
            && (self.w - self.w_old).abs() < self.epsilon
            && (self.w2 - self.w2_old).abs() < self.epsilon
    }

    fn sends_exhausted(&self) -> bool {
        self.max_sends > 0 && self.sent_count >= self.max_sends
    }

    /// Pairwise average of both tracked moments, then re-decide
    /// connectivity for the single neighbour just heard from.
    fn apply_update(&mut self, now: SimTime, from: PeerAddr, peer_m0: f64, peer_w: f64, peer_w2: f64) {
        self.w_old = self.w;
        self.w2_old = self.w2;
        self.w = (self.w + peer_w) / 2.0;
        self.w2 = (self.w2 + peer_w2) / 2.0;
        logging::updat(
            now,
            self.addr,
            None,
            self.w_old,
            self.w,
            Some(self.w2_old),
            Some(self.w2),
            Some(self.variance()),
        );
        let decision = connectivity::decide(self.m0, peer_m0, self.variance());
        connectivity::record_decision(&mut self.connectivity_map, self.addr, from, decision, now);
    }
}

impl LifecycleNode for VarGossipNode {
    fn own_addr(&self) -> PeerAddr {
        self.addr
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn on_start(&mut self, now: SimTime) -> Vec<Effect> {
        logging::init(now, self.addr, self.m0);
        vec![Effect::ScheduleActiveTimer(self.initial_delay)]
    }

    fn on_timer(&mut self, now: SimTime, rng: &mut dyn Rng) -> Vec<Effect> {
        if self.sends_exhausted() {
            return vec![];
        }
        if self.locally_converged() {
            return vec![Effect::ScheduleActiveTimer(self.interval)];
        }
        // VarGossip's own connectivity_map is purely observable; the
        // selector is unfiltered here.
        let Some(peer) = select_peer(&self.peers, self.addr, |_| true, rng) else {
            return vec![Effect::ScheduleActiveTimer(self.interval)];
        };
        logging::asend(now, self.addr, peer, None, self.m0, self.w, Some(self.w2));
        self.sent_count += 1;
        let mut effects = vec![Effect::Send {
            to: peer,
            payload: VarMsg { m0: self.m0, w: self.w, w2: self.w2 }.encode(),
            kind: EffectKind::Initiate,
        }];
        if !self.sends_exhausted() {
            effects.push(Effect::ScheduleActiveTimer(self.interval));
        }
        effects
    }

    fn on_passive_datagram(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect> {
        let Ok(msg) = VarMsg::decode(payload) else {
            tracing::debug!(%from, "dropping malformed VarGossip packet");
            return vec![];
        };
        logging::precv(now, self.addr, from, None, msg.m0, msg.w, msg.w2);
        self.apply_update(now, from, msg.m0, msg.w, msg.w2);
        logging::psend(now, self.addr, from, None, self.m0, self.w, Some(self.w2));
        vec![Effect::Send {
            to: from,
            payload: VarMsg { m0: self.m0, w: self.w, w2: self.w2 }.encode(),
            kind: EffectKind::Reply,
        }]
    }

    fn on_active_reply(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect> {
        let Ok(msg) = VarMsg::decode(payload) else {
            tracing::debug!(%from, "dropping malformed VarGossip reply");
            return vec![];
        };
        logging::arecv(now, self.addr, from, None, msg.w, Some(msg.w2));
        self.apply_update(now, from, msg.m0, msg.w, msg.w2);
        vec![]
    }

    fn on_stop(&mut self, _now: SimTime) {}
}
