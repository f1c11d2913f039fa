//! # Transaction Record Store
//!
//! CRUD and query operations over purchase/transfer transaction records kept in
//! a key-value world state owned by an external ledger runtime.
//!
//! ## Architecture
//!
//! ```text
//! caller ──→ [ContractHandler] ──→ [TransactionStore] ──→ [WorldState port] ──→ ledger
//!                                        │
//!                                        └──→ [TransactionSerializer port]
//! ```
//!
//! The store holds no cache and no locks. Every precondition (create requires
//! absence, update/delete require presence) is re-derived from the world state
//! on each call, and every mutation is staged into one atomic batch.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Unique ID | `create` fails if the TransactionID is present |
//! | Presence | `update`/`delete` fail if the TransactionID is absent |
//! | Atomic record | A transaction is written as one serialized unit |
//! | Full replace | `update` overwrites every field, no merge |
//! | Closed scans | Every cursor is closed on all exit paths |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, composite keys, seed data, configuration, errors
//! - `ports/` - Port traits (inbound API, outbound world state + serializer)
//! - `adapters/` - In-memory and file-backed world state, JSON codec, invocation handler
//! - `service/` - `TransactionStore`, implementing the inbound API
//!
//! ## Usage
//!
//! ```
//! use record_store::{StoreConfig, TransactionStore, TransactionStoreApi};
//!
//! let mut store = TransactionStore::new_in_memory(StoreConfig::default());
//! store.init_ledger().unwrap();
//!
//! let tx = store.read("2").unwrap();
//! assert_eq!(tx.sender, "John Jones");
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[doc(hidden)]
pub mod test_utils;

// Re-export key types for convenience
pub use domain::config::{IndexPolicy, StoreConfig};
pub use domain::entities::{PurchaseDetail, Transaction, SCHEMA_VERSION};
pub use domain::errors::{ErrorKind, SerializationError, StoreError, WorldStateError};
pub use domain::keys::CompositeIndex;
pub use domain::seed::default_seed;
pub use ports::inbound::TransactionStoreApi;
pub use ports::outbound::{StateEntry, StateQueryIterator, StateWrite, TransactionSerializer, WorldState};
pub use service::{InMemoryTransactionStore, StoreDependencies, TransactionStore};

// Re-export adapter types
pub use adapters::contract::{ContractError, ContractHandler, Invocation};
pub use adapters::memory::InMemoryWorldState;
pub use adapters::serializer::JsonTransactionSerializer;

#[cfg(feature = "file-store")]
pub use adapters::file::FileBackedWorldState;
#[cfg(feature = "file-store")]
pub use adapters::lock::{DataDirLock, LockError};
