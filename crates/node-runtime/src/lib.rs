//! # Node Runtime Library
//!
//! Hosts the transaction record store as a process. The binary in `main.rs`
//! wires these modules to stdin/stdout; they are exposed here for testing.
//!
//! - `config` - `NodeConfig` loaded from environment variables
//! - `runtime` - `NodeRuntime`: durable store + JSON-lines invocation loop

pub mod config;
pub mod runtime;

pub use config::{ConfigError, NodeConfig};
pub use runtime::{spawn_line_reader, FileTransactionStore, NodeRuntime, INVALID_REQUEST};
