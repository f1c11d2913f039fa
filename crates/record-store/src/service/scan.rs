//! Scoped scan cursors.

use crate::domain::entities::Transaction;
use crate::domain::errors::StoreError;
use crate::ports::outbound::{StateCursor, StateEntry, TransactionSerializer};

/// Owns a cursor and closes it when dropped.
///
/// `collect_records` closes explicitly on success so a failing close is
/// reported. Every other exit path (decode error, cursor fault, panic) closes
/// in `Drop` and discards the close result.
pub(crate) struct ScanGuard<'a> {
    cursor: Option<StateCursor<'a>>,
}

impl<'a> ScanGuard<'a> {
    pub(crate) fn new(cursor: StateCursor<'a>) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    /// Decode every entry value as a record. One bad entry fails the scan.
    pub(crate) fn collect_records<SR: TransactionSerializer>(
        mut self,
        serializer: &SR,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut records = Vec::new();
        if let Some(cursor) = self.cursor.as_mut() {
            for entry in cursor {
                let entry = entry?;
                let tx = serializer.deserialize(&entry.value).map_err(|e| {
                    #[cfg(feature = "tracing-log")]
                    tracing::warn!("[txl-store] undecodable record at key {:?}: {}", entry.key, e);
                    e
                })?;
                records.push(tx);
            }
        }
        self.finish()?;
        Ok(records)
    }

    /// Raw entries, for callers that decide per entry what to do with values.
    pub(crate) fn collect_entries(mut self) -> Result<Vec<StateEntry>, StoreError> {
        let mut entries = Vec::new();
        if let Some(cursor) = self.cursor.as_mut() {
            for entry in cursor {
                entries.push(entry?);
            }
        }
        self.finish()?;
        Ok(entries)
    }

    /// Whether the cursor yields at least one entry. Reads no further.
    pub(crate) fn has_entries(mut self) -> Result<bool, StoreError> {
        let found = match self.cursor.as_mut().and_then(|cursor| cursor.next()) {
            Some(entry) => {
                entry?;
                true
            }
            None => false,
        };
        self.finish()?;
        Ok(found)
    }

    fn finish(mut self) -> Result<(), StoreError> {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close()?;
        }
        Ok(())
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            let _ = cursor.close();
        }
    }
}
