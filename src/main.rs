//! src/main.rs
//!
//! Binary entry point. Responsible for initializing tracing, loading
//! configuration, instantiating the main `App`, and running it.
//!
//! This binary demonstrates MeanGossip over a small fully-connected mesh
//! (the S1 scenario: three nodes, initial measurements {0, 3, 9}) — the
//! Rust equivalent of an ns-3 `scratch/` example. VarGossip and
//! MultiphaseVarGossip are exercised by the scenario test suite instead of
//! a second binary, since all three variants share the same `App`/`sim`
//! plumbing.

use anyhow::Context;
use gossip_aggregation::config::MeanGossipConfig;
use gossip_aggregation::sim::cluster::Topology;
use gossip_aggregation::{app::Scenario, App};

const DEMO_DEADLINE_SECS: f64 = 500.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the tracing subscriber.
    // RUST_LOG=info will be the default.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration.
    let config = MeanGossipConfig::load().context("Failed to load configuration")?;

    let topology = Topology::full_mesh(3, config.port);
    let scenario = Scenario::Mean { topology, initial_estimates: vec![0.0, 3.0, 9.0], config };

    // Create and run the application.
    if let Err(e) = App::new(scenario, DEMO_DEADLINE_SECS).run().await {
        tracing::error!(error = %e, "💥 Application failed");
        std::process::exit(1);
    }

    Ok(())
}
