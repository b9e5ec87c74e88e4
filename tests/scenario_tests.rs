//! tests/scenario_tests.rs
//!
//! The literal end-to-end scenarios that need a running cluster rather
//! than a single handler call. S2 (two-node push-pull) lives next
//! to `MeanGossipNode` in `src/node/mean.rs`; S5 (T-RECV reset-then-apply)
//! lives next to `MultiphaseVarGossipNode` in `src/node/multiphase.rs`;
//! S6 (codec precision) lives in `src/codec.rs`. Those three only need one
//! node's state, not a cluster, so they stay as unit tests next to the
//! code they exercise.

mod common;

use gossip_aggregation::config::{MeanGossipConfig, MultiphaseVarGossipConfig, VarGossipConfig};
use gossip_aggregation::sim::cluster::Topology;
use test_log::test;

/// S1: MeanGossip, 3 nodes on a shared link, m0 = {0, 3, 9}, eps = 1e-4,
/// MaxPackets = 200, Interval = 1s — every node's final w lands in
/// [3.9, 4.1].
#[test]
fn s1_three_node_mean_gossip_converges_near_the_mean() {
    let topology = Topology::full_mesh(3, 31000);
    let config = MeanGossipConfig { max_packets: 200, interval_secs: 1.0, epsilon: 1e-4, ..Default::default() };
    let sim = common::run_mean(&topology, &[0.0, 3.0, 9.0], &config, 10, 1000.0);
    for addr in sim.node_addrs() {
        let w = common::mean_node(&sim, addr).w();
        assert!((3.9..=4.1).contains(&w), "node {addr} ended at {w}, expected within [3.9, 4.1]");
    }
}

/// S3: VarGossip, 4 nodes, m0 = {1, 1, 9, 9}. After convergence every
/// node's estimate_w ~= 5 and variance ~= 16; each node marks the other
/// same-valued node as connected.
#[test]
fn s3_var_gossip_converges_and_marks_matching_neighbours_connected() {
    let topology = Topology::full_mesh(4, 31100);
    let config = VarGossipConfig { max_packets: 300, interval_secs: 1.0, epsilon: 1e-6, ..Default::default() };
    let sim = common::run_var(&topology, &[1.0, 1.0, 9.0, 9.0], &config, 11, 2000.0);

    for addr in sim.node_addrs() {
        let node = common::var_node(&sim, addr);
        assert!((node.w() - 5.0).abs() < 0.5, "node {addr} estimate_w = {}", node.w());
        assert!((node.variance() - 16.0).abs() < 2.0, "node {addr} variance = {}", node.variance());
    }

    // Nodes 0 and 1 share m0 = 1; nodes 2 and 3 share m0 = 9. Each must
    // mark its same-valued partner as connected (diff 0 <= sqrt(16)).
    let addrs = &topology.addrs;
    let pairs = [(addrs[0], addrs[1]), (addrs[1], addrs[0]), (addrs[2], addrs[3]), (addrs[3], addrs[2])];
    for (own, partner) in pairs {
        let node = common::var_node(&sim, own);
        assert_eq!(node.connectivity_map().get(&partner), Some(&true), "{own} should mark {partner} connected");
    }
}

/// S4: MultiphaseVarGossip, 6 nodes in two disjoint value clusters,
/// m0 = {0, 0, 0, 10, 10, 10}, EpochLength = 20, MaxPackets = 0
/// (unlimited), Interval = 1s. After two epoch transitions each node's
/// connectivity_active marks its three co-cluster members true and the
/// three out-cluster members false.
#[test]
fn s4_multiphase_var_gossip_clusters_by_value_after_two_epochs() {
    let topology = Topology::full_mesh(6, 31200);
    let config = MultiphaseVarGossipConfig { epoch_length: 20, max_packets: 0, interval_secs: 1.0, ..Default::default() };
    let initial_estimates = [0.0, 0.0, 0.0, 10.0, 10.0, 10.0];
    let sim = common::run_multiphase(&topology, &initial_estimates, &config, 12, 5000.0);

    for addr in sim.node_addrs() {
        assert!(
            common::multiphase_node(&sim, addr).current_epoch() >= 2,
            "node {addr} only reached epoch {}",
            common::multiphase_node(&sim, addr).current_epoch()
        );
    }

    let addrs = &topology.addrs;
    let cluster_a = &addrs[0..3];
    let cluster_b = &addrs[3..6];
    for &own in cluster_a {
        let node = common::multiphase_node(&sim, own);
        for &peer in cluster_a {
            if peer != own {
                assert_eq!(node.connectivity_active().get(&peer), Some(&true), "{own} vs co-cluster {peer}");
            }
        }
        for &peer in cluster_b {
            assert_eq!(node.connectivity_active().get(&peer), Some(&false), "{own} vs out-cluster {peer}");
        }
    }
}
