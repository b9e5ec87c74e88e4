//! src/node/mean.rs
//!
//! MeanGossip: aggregates a single scalar by pairwise averaging. The
//! simplest of the three variants — this node always reschedules at
//! convergence rather than going quiet, so a late passive update can
//! still reopen gossip.

use crate::codec::MeanMsg;
use crate::config::MeanGossipConfig;
use crate::domain::{PeerAddr, PeerSet, SimTime};
use crate::logging;
use crate::node::{Effect, EffectKind, LifecycleNode};
use crate::selector::select_peer;
use crate::sim::rng::Rng;

pub struct MeanGossipNode {
    addr: PeerAddr,
    peers: PeerSet,
    interval: SimTime,
    max_sends: u32,
    epsilon: f64,
    m0: f64,
    w: f64,
    w_old: f64,
    sent_count: u32,
}

impl MeanGossipNode {
    pub fn new(addr: PeerAddr, peers: PeerSet, initial_estimate: f64, config: &MeanGossipConfig) -> Self {
        Self {
            addr,
            peers,
            interval: config.interval_secs,
            max_sends: config.max_packets,
            epsilon: config.epsilon,
            m0: initial_estimate,
            w: initial_estimate,
            w_old: initial_estimate,
            sent_count: 0,
        }
    }

    /// only meaningful once at least one active send has happened.
    fn locally_converged(&self) -> bool {
        self.sent_count > 0 && (self.w - self.w_old).abs() < self.epsilon
    }

    fn apply_update(&mut self, now: SimTime, peer_w: f64) -> f64 {
        self.w_old = self.w;
        self.w = (self.w + peer_w) / 2.0;
        logging::updat(now, self.addr, None, self.w_old, self.w, None, None, None);
        self.w
    }

    fn sends_exhausted(&self) -> bool {
        self.max_sends > 0 && self.sent_count >= self.max_sends
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn sent_count(&self) -> u32 {
        self.sent_count
    }
}

impl LifecycleNode for MeanGossipNode {
    fn own_addr(&self) -> PeerAddr {
        self.addr
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn on_start(&mut self, now: SimTime) -> Vec<Effect> {
        logging::init(now, self.addr, self.m0);
        // MeanGossip carries no InitialDelay attribute; the first
        // tick is scheduled immediately.
        vec![Effect::ScheduleActiveTimer(0.0)]
    }

    fn on_timer(&mut self, now: SimTime, rng: &mut dyn Rng) -> Vec<Effect> {
        if self.sends_exhausted() {
            return vec![];
        }
        if self.locally_converged() {
            return vec![Effect::ScheduleActiveTimer(self.interval)];
        }
        let Some(peer) = select_peer(&self.peers, self.addr, |_| true, rng) else {
            // no eligible peer, defer and reschedule.
            return vec![Effect::ScheduleActiveTimer(self.interval)];
        };
        logging::asend(now, self.addr, peer, None, self.w, self.w, None);
        self.sent_count += 1;
        let mut effects = vec![Effect::Send {
            to: peer,
            payload: MeanMsg { w: self.w }.encode(),
            kind: EffectKind::Initiate,
        }];
        if !self.sends_exhausted() {
            effects.push(Effect::ScheduleActiveTimer(self.interval));
        }
        effects
    }

    fn on_passive_datagram(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect> {
        let Ok(msg) = MeanMsg::decode(payload) else {
            tracing::debug!(%from, "dropping malformed MeanGossip packet");
            return vec![];
        };
        let w_new = self.apply_update(now, msg.w);
        logging::recv_resp(now, self.addr, from, msg.w, w_new);
        vec![Effect::Send { to: from, payload: MeanMsg { w: w_new }.encode(), kind: EffectKind::Reply }]
    }

    fn on_active_reply(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect> {
        let Ok(msg) = MeanMsg::decode(payload) else {
            tracing::debug!(%from, "dropping malformed MeanGossip reply");
            return vec![];
        };
        logging::arecv(now, self.addr, from, None, msg.w, None);
        let w_new = self.apply_update(now, msg.w);
        logging::recv_resp(now, self.addr, from, msg.w, w_new);
        vec![]
    }

    fn on_stop(&mut self, _now: SimTime) {}
}
