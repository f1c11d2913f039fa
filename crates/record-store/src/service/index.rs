//! # Location Index Bookkeeping
//!
//! The `location~name` index lives in the same world state as the records, so
//! a ledger can outlive the policy it was written under. Two rules keep it
//! honest:
//!
//! - Replacing or removing a record always retires the record's existing index
//!   entry, whatever the current policy.
//! - The policy the index was built under is recorded next to it. Opening the
//!   store under a different policy rebuilds (or clears) the index in one batch.

use super::scan::ScanGuard;
use super::TransactionStore;
use crate::domain::entities::SCHEMA_VERSION;
use crate::domain::errors::StoreError;
use crate::domain::keys::{
    self, CompositeIndex, INDEX_POLICY_METADATA, METADATA_NAMESPACE, SCHEMA_VERSION_METADATA,
};
use crate::ports::outbound::{StateWrite, TransactionSerializer, WorldState};

impl<WS, SR> TransactionStore<WS, SR>
where
    WS: WorldState,
    SR: TransactionSerializer,
{
    /// Bring the location index in line with the configured policy.
    ///
    /// Returns `true` when the index was rebuilt. A matching policy marker is
    /// a no-op. Data written by a newer record schema is refused before
    /// anything is touched.
    pub fn reconcile_index(&mut self) -> Result<bool, StoreError> {
        let schema_key = metadata_key(SCHEMA_VERSION_METADATA)?;
        if let Some(raw) = self.world_state.get(&schema_key)? {
            let stored = String::from_utf8_lossy(&raw)
                .trim()
                .parse::<u16>()
                .map_err(|_| StoreError::Serialization {
                    message: format!("unreadable schema version marker {:?}", raw),
                })?;
            if stored > SCHEMA_VERSION {
                return Err(StoreError::Serialization {
                    message: format!(
                        "stored records use schema version {}, this store reads up to {}",
                        stored, SCHEMA_VERSION
                    ),
                });
            }
        }

        let policy = self.config.index_policy;
        let policy_key = metadata_key(INDEX_POLICY_METADATA)?;
        let recorded = self.world_state.get(&policy_key)?;
        if recorded.as_deref() == Some(policy.as_str().as_bytes()) {
            return Ok(false);
        }

        let mut ops = Vec::new();

        let cursor = self
            .world_state
            .partial_composite_key_scan(CompositeIndex::LocationName.namespace(), &[])?;
        let existing = ScanGuard::new(cursor).collect_entries()?;
        let removed = existing.len();
        ops.extend(existing.into_iter().map(|entry| StateWrite::delete(entry.key)));

        let mut indexed = 0usize;
        if policy.maintains_index() {
            let cursor = self.world_state.range_scan("", "")?;
            for entry in ScanGuard::new(cursor).collect_entries()? {
                if let Some(index_key) = self.stale_index_key(&entry.value, &entry.key) {
                    ops.push(StateWrite::put(index_key, entry.value));
                    indexed += 1;
                }
            }
        }

        ops.push(StateWrite::put(policy_key, policy.as_str()));
        ops.push(StateWrite::put(schema_key, SCHEMA_VERSION.to_string()));
        self.commit(ops)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[txl-store] location index reconciled to {} (was {}): {} entries removed, {} written",
            policy,
            recorded
                .as_deref()
                .map(String::from_utf8_lossy)
                .unwrap_or_else(|| "unrecorded".into()),
            removed,
            indexed
        );
        #[cfg(not(feature = "tracing-log"))]
        let _ = (removed, indexed);

        Ok(true)
    }

    /// Delete for the index entry of a record that is being replaced or removed.
    ///
    /// `replacement` is the index key the record will have afterwards, if any.
    /// Under `PrimaryOnly` the entry is only deleted when it is actually there,
    /// so batches over an unindexed ledger stay free of index writes.
    pub(super) fn retire_index_entry(
        &self,
        prior: &[u8],
        id: &str,
        replacement: Option<&str>,
    ) -> Result<Option<StateWrite>, StoreError> {
        let stale = match self.stale_index_key(prior, id) {
            Some(stale) => stale,
            None => return Ok(None),
        };
        if replacement == Some(stale.as_str()) {
            return Ok(None);
        }
        if self.config.index_policy.maintains_index() || self.world_state.get(&stale)?.is_some() {
            return Ok(Some(StateWrite::delete(stale)));
        }
        Ok(None)
    }

    /// Index key of a stored record, if it can still be derived.
    ///
    /// A value that no longer decodes (or whose location is not a valid key
    /// part) has no index entry this store could have written.
    fn stale_index_key(&self, stored: &[u8], id: &str) -> Option<String> {
        let stored = match self.serializer.deserialize(stored) {
            Ok(stored) => stored,
            Err(_e) => {
                #[cfg(feature = "tracing-log")]
                tracing::warn!(
                    "[txl-store] stored transaction {} does not decode, skipping its index entry: {}",
                    id,
                    _e
                );
                return None;
            }
        };
        self.location_index_key(&stored.location, id).ok()
    }
}

fn metadata_key(name: &str) -> Result<String, StoreError> {
    Ok(keys::build_composite_key(METADATA_NAMESPACE, &[name])?)
}
