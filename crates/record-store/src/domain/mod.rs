//! # Domain Layer
//!
//! Pure domain logic for the record store. No I/O happens here.
//!
//! ## Modules
//!
//! - `entities` - `Transaction` and its embedded `PurchaseDetail`
//! - `keys` - Simple and composite world state key encoding
//! - `seed` - The bootstrap record set
//! - `config` - `StoreConfig` and the location index policy
//! - `errors` - Domain and port error types

pub mod config;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod seed;
