//! src/sim/runtime.rs
//!
//! The discrete-event loop: a single thread, a priority queue of
//! timestamped events, no preemption. Ties break in the order events were
//! scheduled, which is what lets the scenario tests in `tests/` assert an
//! exact log sequence rather than "eventually consistent".

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::domain::{PeerAddr, SimTime};
use crate::node::{Effect, EffectKind, LifecycleNode};
use crate::sim::clock::Clock;
use crate::sim::rng::Rng;
use crate::sim::transport::Transport;

/// Total order over `SimTime` for the event heap. `SimTime` values in this
/// crate are always finite and non-negative, so `partial_cmp` never sees
/// `NaN`; the `unwrap_or(Equal)` fallback only guards against a caller
/// misusing the API, not an expected code path.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedTime(SimTime);

impl Eq for OrderedTime {}

impl PartialOrd for OrderedTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Ord for OrderedTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

#[derive(Debug, Clone)]
enum EventKind {
    ActiveTimer { addr: PeerAddr },
    Deliver { to: PeerAddr, from: PeerAddr, payload: Vec<u8>, kind: EffectKind },
}

#[derive(Debug, Clone)]
struct ScheduledEvent {
    time: OrderedTime,
    /// Insertion sequence, used as the tie-break so two events scheduled
    /// for the same instant fire in the order they were scheduled.
    seq: u64,
    kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for ScheduledEvent {}
impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest (time, seq) sorts highest.
        (other.time, other.seq).cmp(&(self.time, self.seq))
    }
}

/// Owns every node, the shared transport, and the event queue, and drives
/// the whole cluster forward one event at a time. The ns-3 analogue is
/// `Simulator::Run`; here it is an explicit struct rather than a process-
/// wide singleton, so a test can construct as many independent runs as it
/// likes.
pub struct Simulation {
    now: SimTime,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEvent>,
    nodes: HashMap<PeerAddr, Box<dyn LifecycleNode>>,
    stopped: std::collections::HashSet<PeerAddr>,
    transport: Box<dyn Transport>,
    rng: Box<dyn Rng>,
}

impl Simulation {
    pub fn new(transport: Box<dyn Transport>, rng: Box<dyn Rng>) -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            queue: BinaryHeap::new(),
            nodes: HashMap::new(),
            stopped: std::collections::HashSet::new(),
            transport,
            rng,
        }
    }

    pub fn add_node(&mut self, node: Box<dyn LifecycleNode>) {
        let addr = node.own_addr();
        self.nodes.insert(addr, node);
    }

    fn schedule_at(&mut self, time: SimTime, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEvent { time: OrderedTime(time), seq, kind });
    }

    /// `StartApplication` for every node, in address order (stable, so the
    /// same topology always boots the same way).
    pub fn start(&mut self) {
        let mut addrs: Vec<PeerAddr> = self.nodes.keys().copied().collect();
        addrs.sort();
        for addr in addrs {
            let effects = self.nodes.get_mut(&addr).expect("node present").on_start(self.now);
            self.apply(addr, effects);
        }
    }

    /// `StopApplication` for every remaining node.
    pub fn stop(&mut self) {
        let addrs: Vec<PeerAddr> = self.nodes.keys().copied().collect();
        for addr in addrs {
            if let Some(node) = self.nodes.get_mut(&addr) {
                node.on_stop(self.now);
            }
            self.stopped.insert(addr);
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Gives a test harness read access to a node's state after a run.
    /// The simulator has no business knowing what's inside — callers
    /// downcast via `LifecycleNode::as_any`.
    pub fn node(&self, addr: PeerAddr) -> Option<&dyn LifecycleNode> {
        self.nodes.get(&addr).map(|n| n.as_ref())
    }

    pub fn node_addrs(&self) -> Vec<PeerAddr> {
        let mut addrs: Vec<PeerAddr> = self.nodes.keys().copied().collect();
        addrs.sort();
        addrs
    }

    /// Runs until the queue drains or `deadline` is reached, whichever
    /// comes first.
    pub fn run_until(&mut self, deadline: SimTime) {
        self.run_while(deadline, || true);
    }

    /// Like `run_until`, but also stops early the first time
    /// `should_continue` returns `false` — the hook the `App` lifecycle
    /// uses to honor an operator-requested shutdown without the event
    /// loop knowing anything about tokio.
    pub fn run_while(&mut self, deadline: SimTime, should_continue: impl Fn() -> bool) {
        while let Some(event) = self.queue.peek() {
            if event.time.0 > deadline || !should_continue() {
                break;
            }
            let event = self.queue.pop().expect("just peeked");
            self.now = event.time.0;
            self.dispatch(event.kind);
        }
    }

    fn dispatch(&mut self, kind: EventKind) {
        match kind {
            EventKind::ActiveTimer { addr } => {
                if self.stopped.contains(&addr) {
                    return;
                }
                let effects = match self.nodes.get_mut(&addr) {
                    Some(node) => node.on_timer(self.now, &mut *self.rng),
                    None => return,
                };
                self.apply(addr, effects);
            }
            EventKind::Deliver { to, from, payload, kind } => {
                if self.stopped.contains(&to) {
                    return;
                }
                let effects = match self.nodes.get_mut(&to) {
                    Some(node) => match kind {
                        EffectKind::Initiate => node.on_passive_datagram(self.now, from, &payload),
                        EffectKind::Reply => node.on_active_reply(self.now, from, &payload),
                    },
                    None => return,
                };
                self.apply(to, effects);
            }
        }
    }

    fn apply(&mut self, owner: PeerAddr, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleActiveTimer(delay) => {
                    self.schedule_at(self.now + delay, EventKind::ActiveTimer { addr: owner });
                }
                Effect::Send { to, payload, kind } => {
                    if let Some(delay) = self.transport.transmit(owner, to, &mut *self.rng) {
                        self.schedule_at(self.now + delay, EventKind::Deliver { to, from: owner, payload, kind });
                    }
                }
            }
        }
    }
}

impl Clock for Simulation {
    fn now(&self) -> SimTime {
        self.now
    }
}
