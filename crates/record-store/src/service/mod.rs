//! # Transaction Store Service
//!
//! The service implementing `TransactionStoreApi` over injected ports.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates ids before touching the world state
//! 2. Re-derives existence from the world state on every call
//! 3. Stages each mutation (record plus index entries) into one atomic batch
//! 4. Closes every scan cursor, including on early error return
//! 5. Rebuilds the location index when opened under a different policy

mod index;
mod scan;
mod store;

use crate::adapters::memory::InMemoryWorldState;
use crate::adapters::serializer::JsonTransactionSerializer;
use crate::domain::config::StoreConfig;
use crate::domain::errors::StoreError;
use crate::domain::keys::CompositeIndex;
use scan::ScanGuard;
use crate::ports::outbound::{TransactionSerializer, WorldState};

/// The Transaction Store.
///
/// Holds no cache: the only state besides the injected ports is configuration.
pub struct TransactionStore<WS, SR>
where
    WS: WorldState,
    SR: TransactionSerializer,
{
    /// Ledger key-value state.
    pub(crate) world_state: WS,
    /// Record codec.
    pub(crate) serializer: SR,
    /// Seed records and index policy.
    pub(crate) config: StoreConfig,
}

/// Dependencies for TransactionStore
pub struct StoreDependencies<WS, SR> {
    pub world_state: WS,
    pub serializer: SR,
}

/// Store over the in-memory world state and JSON codec.
pub type InMemoryTransactionStore = TransactionStore<InMemoryWorldState, JsonTransactionSerializer>;

impl<WS, SR> TransactionStore<WS, SR>
where
    WS: WorldState,
    SR: TransactionSerializer,
{
    /// Wrap the ports without reading the world state.
    ///
    /// The location index is trusted as found. Hosts reopening persisted state
    /// use `open`, which reconciles it with `config.index_policy` first.
    pub fn new(deps: StoreDependencies<WS, SR>, config: StoreConfig) -> Self {
        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[txl-store] store ready (index policy: {}, {} seed records)",
            config.index_policy,
            config.seed.len()
        );

        Self {
            world_state: deps.world_state,
            serializer: deps.serializer,
            config,
        }
    }

    /// Wrap the ports and reconcile the location index with the policy.
    pub fn open(deps: StoreDependencies<WS, SR>, config: StoreConfig) -> Result<Self, StoreError> {
        let mut store = Self::new(deps, config);
        store.reconcile_index()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn world_state(&self) -> &WS {
        &self.world_state
    }

    /// Direct access to the world state, for hosts and tests.
    pub fn world_state_mut(&mut self) -> &mut WS {
        &mut self.world_state
    }

    /// Whether the world state holds any record. Index and metadata entries
    /// do not count.
    pub fn has_records(&self) -> Result<bool, StoreError> {
        let cursor = self.world_state.range_scan("", "")?;
        ScanGuard::new(cursor).has_entries()
    }

    /// Key of the `location~name` index entry for a record.
    pub(crate) fn location_index_key(&self, location: &str, id: &str) -> Result<String, StoreError> {
        let key = self
            .world_state
            .build_composite_key(CompositeIndex::LocationName.namespace(), &[location, id])?;
        Ok(key)
    }
}

impl InMemoryTransactionStore {
    /// Store over a fresh in-memory world state.
    pub fn new_in_memory(config: StoreConfig) -> Self {
        let deps = StoreDependencies {
            world_state: InMemoryWorldState::new(),
            serializer: JsonTransactionSerializer,
        };
        Self::new(deps, config)
    }
}
