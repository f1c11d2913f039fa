//! # Store Configuration
//!
//! `StoreConfig` carries the seed records for `init_ledger` and the policy for
//! the location index.

use std::fmt;
use std::str::FromStr;

use crate::domain::entities::Transaction;
use crate::domain::seed::default_seed;

/// How the `location~name` composite index is maintained.
///
/// The chaincode this store replaces queried the index but never wrote it, so
/// lookups by location always came back empty. `WriteThrough` fixes that;
/// `PrimaryOnly` keeps the old behavior for deployments that depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexPolicy {
    /// create/update/init_ledger write an index entry; delete removes it.
    #[default]
    WriteThrough,
    /// Only primary records are written. `list_by_location` finds nothing
    /// unless entries were put there by some other writer.
    PrimaryOnly,
}

impl IndexPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexPolicy::WriteThrough => "write-through",
            IndexPolicy::PrimaryOnly => "primary-only",
        }
    }

    pub fn maintains_index(&self) -> bool {
        matches!(self, IndexPolicy::WriteThrough)
    }
}

impl fmt::Display for IndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized index policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown index policy {0:?} (expected \"write-through\" or \"primary-only\")")]
pub struct ParseIndexPolicyError(pub String);

impl FromStr for IndexPolicy {
    type Err = ParseIndexPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write-through" | "writethrough" => Ok(IndexPolicy::WriteThrough),
            "primary-only" | "primaryonly" => Ok(IndexPolicy::PrimaryOnly),
            _ => Err(ParseIndexPolicyError(s.to_string())),
        }
    }
}

/// Configuration for the record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Records written by `init_ledger` (default: the four bootstrap records).
    pub seed: Vec<Transaction>,
    /// Location index maintenance (default: `WriteThrough`).
    pub index_policy: IndexPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            index_policy: IndexPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the seed records.
    pub fn with_seed(mut self, seed: Vec<Transaction>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the location index policy.
    pub fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.seed.len(), 4);
        assert_eq!(config.index_policy, IndexPolicy::WriteThrough);
    }

    #[test]
    fn test_parse_index_policy() {
        assert_eq!("write-through".parse(), Ok(IndexPolicy::WriteThrough));
        assert_eq!(" Primary-Only ".parse(), Ok(IndexPolicy::PrimaryOnly));
        assert!("sometimes".parse::<IndexPolicy>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new()
            .with_seed(Vec::new())
            .with_index_policy(IndexPolicy::PrimaryOnly);
        assert!(config.seed.is_empty());
        assert!(!config.index_policy.maintains_index());
    }
}
