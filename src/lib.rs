//! Wallet Persona Library
//!
//! Behavioral profiling for Ethereum addresses: balance and activity are
//! pulled from a JSON-RPC ledger, every known profile is re-clustered into
//! three usage groups on each update, and pairs of addresses are compared by
//! cosine similarity.

pub mod address;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod persona;
pub mod profile;
pub mod server;
pub mod similarity;

// Re-export commonly used types
pub use address::Address;
pub use config::Config;
pub use engine::PersonaEngine;
pub use error::{Error, Result};
