//! src/config.rs
//!
//! Per-variant, strongly-typed configuration, loaded from `config.toml`
//! plus `GOSSIP_`-prefixed environment overrides via `figment`, layered
//! the same way across all three variants, split three ways here because
//! the three variants are sibling implementations of one capability
//! rather than a shared base class.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Shared defaults across all three variants.
const DEFAULT_PORT: u16 = 9;
const DEFAULT_MAX_PACKETS: u32 = 100;
const DEFAULT_INTERVAL_SECS: f64 = 1.0;
const DEFAULT_INITIAL_ESTIMATE: f64 = 0.0;
const DEFAULT_EPSILON: f64 = 1e-4;
const DEFAULT_INITIAL_DELAY_SECS: f64 = 0.0;
const DEFAULT_EPOCH_LENGTH: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanGossipConfig {
    pub port: u16,
    /// 0 means unlimited.
    pub max_packets: u32,
    pub interval_secs: f64,
    pub initial_estimate: f64,
    pub epsilon: f64,
}

impl Default for MeanGossipConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_packets: DEFAULT_MAX_PACKETS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            initial_estimate: DEFAULT_INITIAL_ESTIMATE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl MeanGossipConfig {
    pub fn load() -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("GOSSIP_"))
            .extract()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarGossipConfig {
    pub port: u16,
    pub max_packets: u32,
    pub interval_secs: f64,
    pub initial_delay_secs: f64,
    pub initial_estimate: f64,
    pub epsilon: f64,
}

impl Default for VarGossipConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_packets: DEFAULT_MAX_PACKETS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            initial_estimate: DEFAULT_INITIAL_ESTIMATE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl VarGossipConfig {
    pub fn load() -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("GOSSIP_"))
            .extract()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiphaseVarGossipConfig {
    pub port: u16,
    /// 0 or absent means unlimited.
    pub max_packets: u32,
    pub interval_secs: f64,
    pub initial_delay_secs: f64,
    pub initial_estimate: f64,
    pub epsilon: f64,
    pub epoch_length: u32,
}

impl Default for MultiphaseVarGossipConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_packets: DEFAULT_MAX_PACKETS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            initial_estimate: DEFAULT_INITIAL_ESTIMATE,
            epsilon: DEFAULT_EPSILON,
            epoch_length: DEFAULT_EPOCH_LENGTH,
        }
    }
}

impl MultiphaseVarGossipConfig {
    pub fn load() -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("GOSSIP_"))
            .extract()?;
        Ok(config)
    }

    /// `epoch_length` must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.epoch_length == 0 {
            return Err(crate::error::Error::InvalidAttribute(
                "epoch_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
