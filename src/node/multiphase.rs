//! src/node/multiphase.rs
//!
//! MultiphaseVarGossip: VarGossip plus an epoch controller. Connectivity
//! decisions made during an epoch stage into
//! `connectivity_tentative` and only take effect — as `connectivity_active`,
//! the neighbour-selector filter — at the next epoch boundary, so the peer
//! graph coarsens into clusters over successive epochs.

use std::collections::HashMap;

use crate::codec::EpochMsg;
use crate::config::MultiphaseVarGossipConfig;
use crate::domain::{Epoch, PeerAddr, PeerSet, SimTime};
use crate::logging;
use crate::node::connectivity;
use crate::node::{Effect, EffectKind, LifecycleNode};
use crate::selector::select_peer;
use crate::sim::rng::Rng;

pub struct MultiphaseVarGossipNode {
    addr: PeerAddr,
    peers: PeerSet,
    interval: SimTime,
    initial_delay: SimTime,
    max_sends: u32,
    epoch_length: u32,
    m0: f64,
    w: f64,
    w_old: f64,
    w2: f64,
    w2_old: f64,
    sent_count: u32,
    current_epoch: Epoch,
    messages_this_epoch: u32,
    changed_this_epoch: bool,
    neighbour_measurements: HashMap<PeerAddr, f64>,
    connectivity_active: HashMap<PeerAddr, bool>,
    connectivity_tentative: HashMap<PeerAddr, bool>,
}

impl MultiphaseVarGossipNode {
    pub fn new(
        addr: PeerAddr,
        peers: PeerSet,
        initial_estimate: f64,
        config: &MultiphaseVarGossipConfig,
    ) -> Self {
        //  edge case: epoch 0's active filter admits every neighbour;
        // the tentative map starts all-false so a silent neighbour is
        // dropped at the first boundary.
        let connectivity_active: HashMap<PeerAddr, bool> =
            peers.iter_excluding(addr).map(|&p| (p, true)).collect();
        let connectivity_tentative: HashMap<PeerAddr, bool> =
            peers.iter_excluding(addr).map(|&p| (p, false)).collect();
        Self {
            addr,
            peers,
            interval: config.interval_secs,
            initial_delay: config.initial_delay_secs,
            max_sends: config.max_packets,
            epoch_length: config.epoch_length,
            m0: initial_estimate,
            w: initial_estimate,
            w_old: initial_estimate,
            w2: initial_estimate * initial_estimate,
            w2_old: initial_estimate * initial_estimate,
            sent_count: 0,
            current_epoch: 0,
            messages_this_epoch: 0,
            changed_this_epoch: false,
            neighbour_measurements: HashMap::new(),
            connectivity_active,
            connectivity_tentative,
        }
    }

    pub fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    pub fn variance(&self) -> f64 {
        self.w2 - self.w * self.w
    }

    pub fn connectivity_active(&self) -> &HashMap<PeerAddr, bool> {
        &self.connectivity_active
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn sent_count(&self) -> u32 {
        self.sent_count
    }

    fn sends_exhausted(&self) -> bool {
        self.max_sends > 0 && self.sent_count >= self.max_sends
    }

    ///  StartEpoch, steps 1-6, executed atomically with respect to
    /// whatever triggered it. `incoming_epoch` is `None` for a T-SEND
    /// trigger (the node advances its own epoch by one) and `Some(e)` for
    /// a T-RECV trigger (the node jumps to at least `e`).
    fn start_epoch(&mut self, now: SimTime, incoming_epoch: Option<Epoch>) {
        self.current_epoch = match incoming_epoch {
            Some(e) => self.current_epoch.max(e),
            None => self.current_epoch + 1,
        };
        self.messages_this_epoch = 0;
        self.connectivity_active = std::mem::take(&mut self.connectivity_tentative);
        self.connectivity_tentative = self.connectivity_active.clone();
        self.w_old = self.w;
        self.w2_old = self.w2;
        self.w = self.m0;
        self.w2 = self.m0 * self.m0;
        self.changed_this_epoch = false;
        logging::phase(now, self.addr, self.current_epoch);
    }

    /// T-RECV: applied before the payload that triggered it is processed,
    /// so the reset happens first and the update participates in the new
    /// epoch.
    fn maybe_advance_on_receipt(&mut self, now: SimTime, incoming_epoch: Epoch) {
        if incoming_epoch > self.current_epoch {
            self.start_epoch(now, Some(incoming_epoch));
        }
    }

    fn apply_update(&mut self, now: SimTime, from: PeerAddr, peer_m0: f64, peer_w: f64, peer_w2: f64) {
        self.w_old = self.w;
        self.w2_old = self.w2;
        self.w = (self.w + peer_w) / 2.0;
        self.w2 = (self.w2 + peer_w2) / 2.0;
        self.neighbour_measurements.insert(from, peer_m0);
        logging::updat(
            now,
            self.addr,
            Some(self.current_epoch),
            self.w_old,
            self.w,
            Some(self.w2_old),
            Some(self.w2),
            Some(self.variance()),
        );
        self.refresh_connectivity(now);
    }

    fn refresh_connectivity(&mut self, now: SimTime) {
        let variance = self.variance();
        let decisions: Vec<(PeerAddr, bool)> = self
            .neighbour_measurements
            .iter()
            .map(|(&peer, &peer_m0)| (peer, connectivity::decide(self.m0, peer_m0, variance)))
            .collect();
        for (peer, decision) in decisions {
            let old = self.connectivity_tentative.insert(peer, decision);
            if old != Some(decision) {
                self.changed_this_epoch = true;
                logging::change(now, self.addr, peer, old, decision);
            }
        }
    }
}

impl LifecycleNode for MultiphaseVarGossipNode {
    fn own_addr(&self) -> PeerAddr {
        self.addr
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn on_start(&mut self, now: SimTime) -> Vec<Effect> {
        logging::init(now, self.addr, self.m0);
        logging::phase(now, self.addr, self.current_epoch);
        vec![Effect::ScheduleActiveTimer(self.initial_delay)]
    }

    fn on_timer(&mut self, now: SimTime, rng: &mut dyn Rng) -> Vec<Effect> {
        if self.sends_exhausted() {
            return vec![];
        }
        // MultiphaseVar never skips a send for convergence; it runs
        // a fixed number of messages per epoch instead.
        let active = &self.connectivity_active;
        let Some(peer) = select_peer(&self.peers, self.addr, |p| active.get(p).copied().unwrap_or(false), rng)
        else {
            return vec![Effect::ScheduleActiveTimer(self.interval)];
        };
        logging::asend(now, self.addr, peer, Some(self.current_epoch), self.m0, self.w, Some(self.w2));
        self.sent_count += 1;
        self.messages_this_epoch += 1;
        let payload = EpochMsg { epoch: self.current_epoch, m0: self.m0, w: self.w, w2: self.w2 }.encode();
        let mut effects = vec![Effect::Send { to: peer, payload, kind: EffectKind::Initiate }];
        // T-SEND fires after the send that fills the epoch's quota.
        if self.messages_this_epoch >= self.epoch_length {
            self.start_epoch(now, None);
        }
        if !self.sends_exhausted() {
            effects.push(Effect::ScheduleActiveTimer(self.interval));
        }
        effects
    }

    fn on_passive_datagram(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect> {
        let Ok(msg) = EpochMsg::decode(payload) else {
            tracing::debug!(%from, "dropping malformed MultiphaseVarGossip packet");
            return vec![];
        };
        self.maybe_advance_on_receipt(now, msg.epoch);
        logging::precv(now, self.addr, from, Some(self.current_epoch), msg.m0, msg.w, msg.w2);
        self.apply_update(now, from, msg.m0, msg.w, msg.w2);
        logging::psend(now, self.addr, from, Some(self.current_epoch), self.m0, self.w, Some(self.w2));
        let reply = EpochMsg { epoch: self.current_epoch, m0: self.m0, w: self.w, w2: self.w2 }.encode();
        vec![Effect::Send { to: from, payload: reply, kind: EffectKind::Reply }]
    }

    fn on_active_reply(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect> {
        let Ok(msg) = EpochMsg::decode(payload) else {
            tracing::debug!(%from, "dropping malformed MultiphaseVarGossip reply");
            return vec![];
        };
        self.maybe_advance_on_receipt(now, msg.epoch);
        logging::arecv(now, self.addr, from, Some(self.current_epoch), msg.w, Some(msg.w2));
        self.apply_update(now, from, msg.m0, msg.w, msg.w2);
        vec![]
    }

    fn on_stop(&mut self, _now: SimTime) {}
}
