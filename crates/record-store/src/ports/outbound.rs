//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the record store requires from its host.
//!
//! - `WorldState`: the ledger's key-value state. Production hosts bridge this
//!   to the ledger runtime; `InMemoryWorldState` and `FileBackedWorldState`
//!   ship with the crate.
//! - `TransactionSerializer`: record <-> bytes.

use crate::domain::entities::Transaction;
use crate::domain::errors::{SerializationError, WorldStateError};
use crate::domain::keys::{self, EMPTY_KEY_SUBSTITUTE};

/// A key and its stored value, as produced by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// Lazy cursor over world state entries in key order.
///
/// The cursor holds resources in the backing store until `close` is called.
/// Callers must close it on every exit path, including early returns.
pub trait StateQueryIterator: Iterator<Item = Result<StateEntry, WorldStateError>> {
    /// Release the cursor. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), WorldStateError>;
}

/// Boxed cursor borrowed from a world state.
pub type StateCursor<'a> = Box<dyn StateQueryIterator + 'a>;

/// Write staged for an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateWrite {
    /// Upsert a key.
    Put { key: String, value: Vec<u8> },
    /// Remove a key.
    Delete { key: String },
}

impl StateWrite {
    pub fn put(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        StateWrite::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        StateWrite::Delete { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            StateWrite::Put { key, .. } | StateWrite::Delete { key } => key,
        }
    }
}

/// Key-value world state maintained by the ledger runtime.
pub trait WorldState: Send + Sync {
    /// Get a value. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WorldStateError>;

    /// Upsert a single key.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), WorldStateError>;

    /// Remove a single key. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), WorldStateError>;

    /// Apply every operation or none of them.
    fn atomic_batch_write(&mut self, operations: Vec<StateWrite>) -> Result<(), WorldStateError>;

    /// Raw cursor over `[start, end)`, or `[start, ..)` when `end` is `None`.
    ///
    /// Adapter primitive with no key rules applied. Use `range_scan` or
    /// `partial_composite_key_scan`.
    fn scan(&self, start: &str, end: Option<&str>) -> Result<StateCursor<'_>, WorldStateError>;

    /// Cursor over simple keys in `[start_key, end_key)`.
    ///
    /// Empty bounds are open. Composite (index) keys are never included.
    fn range_scan(&self, start_key: &str, end_key: &str) -> Result<StateCursor<'_>, WorldStateError> {
        let start = if start_key.is_empty() {
            EMPTY_KEY_SUBSTITUTE
        } else {
            keys::validate_simple_key(start_key)?;
            start_key
        };
        let end = if end_key.is_empty() {
            None
        } else {
            keys::validate_simple_key(end_key)?;
            Some(end_key)
        };
        self.scan(start, end)
    }

    /// Cursor over composite keys starting with `namespace` + `parts`.
    fn partial_composite_key_scan(
        &self,
        namespace: &str,
        parts: &[&str],
    ) -> Result<StateCursor<'_>, WorldStateError> {
        let prefix = self.build_composite_key(namespace, parts)?;
        let end = keys::prefix_end(&prefix);
        self.scan(&prefix, Some(&end))
    }

    /// Deterministic composite key encoding.
    fn build_composite_key(&self, namespace: &str, parts: &[&str]) -> Result<String, WorldStateError> {
        keys::build_composite_key(namespace, parts)
    }
}

/// Encoding of transactions to and from stored bytes.
pub trait TransactionSerializer: Send + Sync {
    fn serialize(&self, tx: &Transaction) -> Result<Vec<u8>, SerializationError>;

    fn deserialize(&self, data: &[u8]) -> Result<Transaction, SerializationError>;
}
