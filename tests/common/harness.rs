//! tests/common/harness.rs
//!
//! Builds and runs an in-memory cluster for one variant, replacing the
//! teacher crate's real-socket `TestNode` harness — there is no socket
//! here, just a `Simulation` and the nodes it owns.

#![allow(dead_code)]

use gossip_aggregation::config::{MeanGossipConfig, MultiphaseVarGossipConfig, VarGossipConfig};
use gossip_aggregation::domain::PeerAddr;
use gossip_aggregation::node::mean::MeanGossipNode;
use gossip_aggregation::node::multiphase::MultiphaseVarGossipNode;
use gossip_aggregation::node::var::VarGossipNode;
use gossip_aggregation::sim::cluster::{self, Topology};
use gossip_aggregation::sim::rng::SimRng;
use gossip_aggregation::sim::runtime::Simulation;
use gossip_aggregation::sim::transport::LossyTransport;

/// A reliable, small-delay transport — enough for deterministic scenario
/// tests that need to reason about exact outcomes without loss noise.
pub fn reliable_transport() -> LossyTransport {
    LossyTransport::reliable(0.01)
}

pub fn run_mean(topology: &Topology, initial_estimates: &[f64], config: &MeanGossipConfig, seed: u64, deadline: f64) -> Simulation {
    let mut sim = cluster::build_mean(
        topology,
        initial_estimates,
        config,
        Box::new(reliable_transport()),
        Box::new(SimRng::seeded(seed)),
    );
    sim.start();
    sim.run_until(deadline);
    sim
}

pub fn run_var(topology: &Topology, initial_estimates: &[f64], config: &VarGossipConfig, seed: u64, deadline: f64) -> Simulation {
    let mut sim = cluster::build_var(
        topology,
        initial_estimates,
        config,
        Box::new(reliable_transport()),
        Box::new(SimRng::seeded(seed)),
    );
    sim.start();
    sim.run_until(deadline);
    sim
}

pub fn run_multiphase(
    topology: &Topology,
    initial_estimates: &[f64],
    config: &MultiphaseVarGossipConfig,
    seed: u64,
    deadline: f64,
) -> Simulation {
    let mut sim = cluster::build_multiphase(
        topology,
        initial_estimates,
        config,
        Box::new(reliable_transport()),
        Box::new(SimRng::seeded(seed)),
    );
    sim.start();
    sim.run_until(deadline);
    sim
}

pub fn mean_node(sim: &Simulation, addr: PeerAddr) -> &MeanGossipNode {
    sim.node(addr).expect("node present").as_any().downcast_ref().expect("MeanGossipNode")
}

pub fn var_node(sim: &Simulation, addr: PeerAddr) -> &VarGossipNode {
    sim.node(addr).expect("node present").as_any().downcast_ref().expect("VarGossipNode")
}

pub fn multiphase_node(sim: &Simulation, addr: PeerAddr) -> &MultiphaseVarGossipNode {
    sim.node(addr).expect("node present").as_any().downcast_ref().expect("MultiphaseVarGossipNode")
}
