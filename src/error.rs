//! src/error.rs
//!
//! Defines the library's custom, comprehensive `Error` enum using `thiserror`.
//! Mirrors the taxonomy in the protocol's error-handling design: fatal
//! errors (`Config`, `Bind`) refuse to start a node; local errors
//! (`Decode`, `SelectorExhausted`, `Send`, `Stopped`) are swallowed by the
//! handler after a log line and never corrupt an estimate.

use crate::domain::PeerAddr;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport endpoint could not bind to {0}")]
    Bind(PeerAddr),

    #[error("malformed packet from {from}: {reason}")]
    Decode { from: PeerAddr, reason: String },

    #[error("no eligible peer to select for {0}")]
    SelectorExhausted(PeerAddr),

    #[error("failed to send datagram to {to}: {reason}")]
    Send { to: PeerAddr, reason: String },

    #[error("event fired after StopApplication")]
    Stopped,

    #[error("tokio task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
