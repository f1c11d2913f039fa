//! # TransactionStoreApi Implementation

use std::collections::HashMap;

use super::scan::ScanGuard;
use super::TransactionStore;
use crate::domain::entities::Transaction;
use crate::domain::errors::StoreError;
use crate::domain::keys::{self, CompositeIndex};
use crate::ports::inbound::TransactionStoreApi;
use crate::ports::outbound::{StateWrite, TransactionSerializer, WorldState};

impl<WS, SR> TransactionStoreApi for TransactionStore<WS, SR>
where
    WS: WorldState,
    SR: TransactionSerializer,
{
    fn create(&mut self, tx: &Transaction) -> Result<(), StoreError> {
        let id = tx.id();
        keys::validate_record_id(id)?;

        if self.world_state.get(id)?.is_some() {
            #[cfg(feature = "tracing-log")]
            tracing::debug!("[txl-store] create rejected: {} already exists", id);
            return Err(StoreError::AlreadyExists { id: id.to_string() });
        }

        let bytes = self.serializer.serialize(tx)?;
        let mut ops = Vec::with_capacity(2);
        if self.config.index_policy.maintains_index() {
            let index_key = self.location_index_key(&tx.location, id)?;
            ops.push(StateWrite::put(index_key, bytes.clone()));
        }
        ops.push(StateWrite::put(id, bytes));
        self.commit(ops)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[txl-store] created transaction {}", id);

        Ok(())
    }

    fn read(&self, id: &str) -> Result<Transaction, StoreError> {
        keys::validate_record_id(id)?;

        let bytes = self.world_state.get(id)?.ok_or_else(|| not_found(id))?;
        Ok(self.serializer.deserialize(&bytes)?)
    }

    fn update(&mut self, tx: &Transaction) -> Result<(), StoreError> {
        let id = tx.id();
        keys::validate_record_id(id)?;

        let prior = self.world_state.get(id)?.ok_or_else(|| not_found(id))?;

        let bytes = self.serializer.serialize(tx)?;
        let index_key = if self.config.index_policy.maintains_index() {
            Some(self.location_index_key(&tx.location, id)?)
        } else {
            None
        };

        let mut ops = Vec::with_capacity(3);
        ops.extend(self.retire_index_entry(&prior, id, index_key.as_deref())?);
        if let Some(index_key) = index_key {
            ops.push(StateWrite::put(index_key, bytes.clone()));
        }
        ops.push(StateWrite::put(id, bytes));
        self.commit(ops)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[txl-store] updated transaction {}", id);

        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        keys::validate_record_id(id)?;

        let prior = self.world_state.get(id)?.ok_or_else(|| not_found(id))?;

        let mut ops = Vec::with_capacity(2);
        ops.extend(self.retire_index_entry(&prior, id, None)?);
        ops.push(StateWrite::delete(id));
        self.commit(ops)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[txl-store] deleted transaction {}", id);

        Ok(())
    }

    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        keys::validate_record_id(id)?;
        Ok(self.world_state.get(id)?.is_some())
    }

    fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let cursor = self.world_state.range_scan("", "")?;
        let records = ScanGuard::new(cursor).collect_records(&self.serializer)?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[txl-store] list_all returned {} records", records.len());

        Ok(records)
    }

    fn list_by_location(&self, location: &str) -> Result<Vec<Transaction>, StoreError> {
        let cursor = self
            .world_state
            .partial_composite_key_scan(CompositeIndex::LocationName.namespace(), &[location])?;
        let records = ScanGuard::new(cursor).collect_records(&self.serializer)?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[txl-store] list_by_location({:?}) returned {} records",
            location,
            records.len()
        );

        Ok(records)
    }

    fn init_ledger(&mut self) -> Result<usize, StoreError> {
        let maintain_index = self.config.index_policy.maintains_index();
        let mut ops = Vec::new();
        // Index entry each id will have once earlier seed entries are applied
        let mut staged_index: HashMap<&str, Option<String>> = HashMap::new();

        for tx in &self.config.seed {
            let id = tx.id();
            keys::validate_record_id(id)?;
            let bytes = self.serializer.serialize(tx)?;
            let index_key = if maintain_index {
                Some(self.location_index_key(&tx.location, id)?)
            } else {
                None
            };

            match staged_index.get(id) {
                Some(Some(staged)) if Some(staged.as_str()) != index_key.as_deref() => {
                    ops.push(StateWrite::delete(staged.clone()));
                }
                Some(_) => {}
                None => {
                    if let Some(prior) = self.world_state.get(id)? {
                        ops.extend(self.retire_index_entry(&prior, id, index_key.as_deref())?);
                    }
                }
            }

            if let Some(index_key) = &index_key {
                ops.push(StateWrite::put(index_key.clone(), bytes.clone()));
            }
            ops.push(StateWrite::put(id, bytes));
            staged_index.insert(id, index_key);
        }

        let count = self.config.seed.len();
        self.commit(ops)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[txl-store] 🌱 ledger initialized with {} transactions", count);

        Ok(count)
    }
}

impl<WS, SR> TransactionStore<WS, SR>
where
    WS: WorldState,
    SR: TransactionSerializer,
{
    /// Apply staged writes as one batch.
    pub(super) fn commit(&mut self, ops: Vec<StateWrite>) -> Result<(), StoreError> {
        #[cfg(feature = "tracing-log")]
        {
            let index_ops = ops
                .iter()
                .filter(|op| op.key().starts_with(keys::COMPOSITE_KEY_NAMESPACE))
                .count();
            if index_ops > 0 {
                tracing::debug!("[txl-store] batch carries {} index writes", index_ops);
            }
        }

        self.world_state.atomic_batch_write(ops).map_err(|e| {
            #[cfg(feature = "tracing-log")]
            tracing::warn!("[txl-store] world state write failed: {}", e);
            StoreError::from(e)
        })
    }
}

fn not_found(id: &str) -> StoreError {
    #[cfg(feature = "tracing-log")]
    tracing::debug!("[txl-store] transaction {} not found", id);
    StoreError::NotFound { id: id.to_string() }
}
