//! src/node/mod.rs
//!
//! The three gossip variants as sibling implementations of one narrow
//! `LifecycleNode` capability: variants are not subtypes of each other,
//! so each is a distinct implementation of the same capability rather
//! than a class hierarchy. Each handler runs to completion
//! against owned state and returns the `Effect`s it wants performed; it
//! never touches the transport or scheduler directly (no suspension
//! points inside a handler).

pub mod connectivity;
pub mod mean;
pub mod multiphase;
pub mod var;

use crate::domain::{PeerAddr, SimTime};
use crate::sim::rng::Rng;

/// Distinguishes an unsolicited initiation from a reply to one, so the
/// `Runtime` knows which handler to invoke on delivery (passive vs.
/// active endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// An active-role send to a peer's passive endpoint.
    Initiate,
    /// A passive-role reply, routed back to the datagram's source.
    Reply,
}

/// What a handler wants the `Runtime` to do next. Handlers never perform
/// I/O or scheduling themselves.
#[derive(Debug, Clone)]
pub enum Effect {
    Send { to: PeerAddr, payload: Vec<u8>, kind: EffectKind },
    /// (Re)arm the single active-role timer after `delay` simulated seconds.
    ScheduleActiveTimer(SimTime),
}

/// The narrow capability the simulator drives every node through —
/// the Rust replacement for inheriting from ns-3's `Application` with
/// virtual `StartApplication`/`StopApplication`/`DoDispose` hooks.
pub trait LifecycleNode: std::any::Any {
    fn own_addr(&self) -> PeerAddr;

    /// Lets test harnesses downcast to a concrete node type to inspect
    /// variant-specific state (estimates, connectivity maps) that the
    /// simulator itself has no business knowing about.
    fn as_any(&self) -> &dyn std::any::Any;

    /// `StartApplication`: binds logical state, schedules the first send.
    fn on_start(&mut self, now: SimTime) -> Vec<Effect>;

    /// The active-role timer fired.
    fn on_timer(&mut self, now: SimTime, rng: &mut dyn Rng) -> Vec<Effect>;

    /// A datagram arrived on the passive endpoint (unsolicited).
    fn on_passive_datagram(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect>;

    /// A reply arrived on the active endpoint.
    fn on_active_reply(&mut self, now: SimTime, from: PeerAddr, payload: &[u8]) -> Vec<Effect>;

    /// `StopApplication`: cancel the pending timer, close endpoints. The
    /// `Runtime` already stops delivering events to this node after this
    /// call; nodes need not track a `Stopped` flag themselves.
    fn on_stop(&mut self, now: SimTime);
}
