//! # Adapters
//!
//! Port implementations shipped with the record store.
//!
//! ## Modules
//!
//! - `memory`: ordered in-memory world state with test controls
//! - `file`: durable single-file world state (feature `file-store`)
//! - `lock`: exclusive data directory lock (feature `file-store`)
//! - `serializer`: JSON record codec
//! - `contract`: function-name invocation handler over the store API

pub mod contract;
pub mod memory;
pub mod serializer;

#[cfg(feature = "file-store")]
pub mod file;
#[cfg(feature = "file-store")]
pub mod lock;
