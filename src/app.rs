//! src/app.rs
//!
//! Defines the main `App` struct, which encapsulates the application's state
//! and manages the lifecycle of the simulation run. This is the only module
//! in the crate that touches the tokio runtime — the simulation itself is a
//! synchronous, single-threaded discrete-event loop run on a blocking
//! task so it cannot starve tokio's reactor.

use tokio_util::sync::CancellationToken;

use crate::config::{MeanGossipConfig, MultiphaseVarGossipConfig, VarGossipConfig};
use crate::error::Result;
use crate::sim::cluster::{self, Topology};
use crate::sim::rng::SimRng;
use crate::sim::transport::LossyTransport;

/// Which variant to run and with what per-node initial measurements. The
/// topology, address assignment, and example scenarios are all explicitly
/// out of scope for the core; this is the thin "scratch example"
/// layer that picks one.
pub enum Scenario {
    Mean { topology: Topology, initial_estimates: Vec<f64>, config: MeanGossipConfig },
    Var { topology: Topology, initial_estimates: Vec<f64>, config: VarGossipConfig },
    Multiphase { topology: Topology, initial_estimates: Vec<f64>, config: MultiphaseVarGossipConfig },
}

/// Encapsulates the entire application, including its configuration and the
/// lifecycle management of the simulation run.
pub struct App {
    scenario: Scenario,
    /// Wall-clock-independent: the simulated-time deadline to run to.
    deadline_secs: f64,
    shutdown_token: CancellationToken,
}

impl App {
    pub fn new(scenario: Scenario, deadline_secs: f64) -> Self {
        Self { scenario, deadline_secs, shutdown_token: CancellationToken::new() }
    }

    /// The main run loop for the application.
    ///
    /// This function performs the following steps:
    ///   1. Builds the cluster for the selected scenario.
    ///   2. Runs the synchronous simulation loop on a blocking task.
    ///   3. Waits for a shutdown signal (like Ctrl+C) and requests the
    ///      simulation stop early; otherwise waits for it to reach its
    ///      deadline on its own.
    pub async fn run(self) -> Result<()> {
        tracing::info!(deadline_secs = self.deadline_secs, "🚀 Starting gossip simulation...");

        let shutdown_token = self.shutdown_token.clone();
        let deadline_secs = self.deadline_secs;
        let scenario = self.scenario;

        let sim_task = tokio::task::spawn_blocking(move || {
            let should_continue = {
                let token = shutdown_token.clone();
                move || !token.is_cancelled()
            };
            match scenario {
                Scenario::Mean { topology, initial_estimates, config } => {
                    let mut sim = cluster::build_mean(
                        &topology,
                        &initial_estimates,
                        &config,
                        Box::new(LossyTransport::default()),
                        Box::new(SimRng::from_entropy()),
                    );
                    sim.start();
                    sim.run_while(deadline_secs, should_continue);
                    sim.stop();
                }
                Scenario::Var { topology, initial_estimates, config } => {
                    let mut sim = cluster::build_var(
                        &topology,
                        &initial_estimates,
                        &config,
                        Box::new(LossyTransport::default()),
                        Box::new(SimRng::from_entropy()),
                    );
                    sim.start();
                    sim.run_while(deadline_secs, should_continue);
                    sim.stop();
                }
                Scenario::Multiphase { topology, initial_estimates, config } => {
                    let mut sim = cluster::build_multiphase(
                        &topology,
                        &initial_estimates,
                        &config,
                        Box::new(LossyTransport::default()),
                        Box::new(SimRng::from_entropy()),
                    );
                    sim.start();
                    sim.run_while(deadline_secs, should_continue);
                    sim.stop();
                }
            }
        });
        tracing::debug!("Simulation task spawned.");

        // --- Wait for Shutdown Signal ---
        let ctrl_c_token = self.shutdown_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received. Requesting early simulation stop...");
                ctrl_c_token.cancel();
            }
        });

        // --- Await Simulation Completion ---
        if let Err(e) = sim_task.await {
            tracing::error!(error = ?e, "Simulation task failed");
        }
        tracing::info!("👋 Simulation finished.");

        Ok(())
    }
}
