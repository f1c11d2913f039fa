//! # Inbound Ports (Driving Ports)
//!
//! The operations the record store exposes to whatever invokes it: a contract
//! dispatcher, an RPC handler, or a test.

use crate::domain::entities::Transaction;
use crate::domain::errors::StoreError;

/// Primary API of the record store.
///
/// Each call is expected to run as one atomic, serialized invocation of the
/// ledger runtime. Mutations check existence first and then act; the two
/// steps are separate world state calls, and nothing here guards against a
/// concurrent invocation slipping in between them.
pub trait TransactionStoreApi {
    /// Store a new transaction.
    ///
    /// ## Errors
    ///
    /// - `AlreadyExists`: a record with this id is present
    /// - `InvalidKey`: the id cannot be used as a world state key
    fn create(&mut self, tx: &Transaction) -> Result<(), StoreError>;

    /// Fetch a transaction by id.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `Serialization`: the stored bytes do not decode
    fn read(&self, id: &str) -> Result<Transaction, StoreError>;

    /// Replace every field of an existing transaction.
    ///
    /// Fields are not merged with the stored record: the caller's value is
    /// written as-is.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no record with this id
    fn update(&mut self, tx: &Transaction) -> Result<(), StoreError>;

    /// Remove a transaction.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no record with this id
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;

    /// Whether a record with this id is present.
    ///
    /// Absence is `Ok(false)`; only world state faults are errors.
    fn exists(&self, id: &str) -> Result<bool, StoreError>;

    /// Every stored transaction, in key order.
    ///
    /// A single undecodable record fails the whole query.
    fn list_all(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Transactions whose location equals `location`, via the
    /// `location~name` composite index.
    fn list_by_location(&self, location: &str) -> Result<Vec<Transaction>, StoreError>;

    /// Write the configured seed records without existence checks.
    ///
    /// Re-running rewrites the same ids with the same content. Returns the
    /// number of records written.
    fn init_ledger(&mut self) -> Result<usize, StoreError>;
}
