//! src/sim/cluster.rs
//!
//! Out of scope for the core protocol, but something has to turn a list
//! of addresses and initial measurements
//! into a runnable `Simulation` — the ns-3 analogue is a `NodeContainer`
//! plus an `ApplicationHelper::Install`. Kept thin: this is wiring, not
//! protocol logic.

use crate::config::{MeanGossipConfig, MultiphaseVarGossipConfig, VarGossipConfig};
use crate::domain::{PeerAddr, PeerSet};
use crate::node::mean::MeanGossipNode;
use crate::node::multiphase::MultiphaseVarGossipNode;
use crate::node::var::VarGossipNode;
use crate::sim::rng::Rng;
use crate::sim::runtime::Simulation;
use crate::sim::transport::Transport;

/// The fixed neighbour graph every node is constructed with — the
/// neighbour set is fixed at application start. `addrs` includes every
/// participant; each node's own peer list is the full slice, since the
/// selector already excludes self.
#[derive(Debug, Clone)]
pub struct Topology {
    pub addrs: Vec<PeerAddr>,
}

impl Topology {
    /// A fully-connected mesh over `count` nodes on loopback, ports
    /// `base_port..base_port+count`.
    pub fn full_mesh(count: u16, base_port: u16) -> Self {
        let addrs = (0..count)
            .map(|i| format!("127.0.0.1:{}", base_port + i).parse().expect("valid socket address"))
            .collect();
        Self { addrs }
    }
}

fn check_lengths(topology: &Topology, initial_estimates: &[f64]) {
    assert_eq!(
        topology.addrs.len(),
        initial_estimates.len(),
        "one initial measurement is required per node in the topology"
    );
}

pub fn build_mean(
    topology: &Topology,
    initial_estimates: &[f64],
    config: &MeanGossipConfig,
    transport: Box<dyn Transport>,
    rng: Box<dyn Rng>,
) -> Simulation {
    check_lengths(topology, initial_estimates);
    let mut sim = Simulation::new(transport, rng);
    for (&addr, &m0) in topology.addrs.iter().zip(initial_estimates) {
        sim.add_node(Box::new(MeanGossipNode::new(addr, PeerSet::new(topology.addrs.clone()), m0, config)));
    }
    sim
}

pub fn build_var(
    topology: &Topology,
    initial_estimates: &[f64],
    config: &VarGossipConfig,
    transport: Box<dyn Transport>,
    rng: Box<dyn Rng>,
) -> Simulation {
    check_lengths(topology, initial_estimates);
    let mut sim = Simulation::new(transport, rng);
    for (&addr, &m0) in topology.addrs.iter().zip(initial_estimates) {
        sim.add_node(Box::new(VarGossipNode::new(addr, PeerSet::new(topology.addrs.clone()), m0, config)));
    }
    sim
}

pub fn build_multiphase(
    topology: &Topology,
    initial_estimates: &[f64],
    config: &MultiphaseVarGossipConfig,
    transport: Box<dyn Transport>,
    rng: Box<dyn Rng>,
) -> Simulation {
    check_lengths(topology, initial_estimates);
    let mut sim = Simulation::new(transport, rng);
    for (&addr, &m0) in topology.addrs.iter().zip(initial_estimates) {
        sim.add_node(Box::new(MultiphaseVarGossipNode::new(addr, PeerSet::new(topology.addrs.clone()), m0, config)));
    }
    sim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SimRng;
    use crate::sim::transport::LossyTransport;

    #[test]
    fn full_mesh_generates_distinct_addrs() {
        let topology = Topology::full_mesh(4, 20000);
        assert_eq!(topology.addrs.len(), 4);
        assert_eq!(topology.addrs[0].port(), 20000);
        assert_eq!(topology.addrs[3].port(), 20003);
    }

    #[test]
    fn build_mean_runs_without_panicking() {
        let topology = Topology::full_mesh(3, 21000);
        let config = MeanGossipConfig { max_packets: 5, ..Default::default() };
        let mut sim = build_mean(
            &topology,
            &[0.0, 3.0, 9.0],
            &config,
            Box::new(LossyTransport::reliable(0.1)),
            Box::new(SimRng::seeded(1)),
        );
        sim.start();
        sim.run_until(20.0);
    }
}
