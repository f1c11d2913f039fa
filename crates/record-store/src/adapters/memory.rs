//! # In-Memory World State
//!
//! Ordered map behind the `WorldState` port, with switches for simulating
//! ledger faults in tests.

use std::collections::btree_map::Range;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::errors::WorldStateError;
use crate::ports::outbound::{StateCursor, StateEntry, StateQueryIterator, StateWrite, WorldState};

/// In-memory world state for tests and embedding.
///
/// Keys are kept ordered, so scans come back in key order. Test controls
/// simulate ledger faults and report how many cursors are still open.
#[derive(Default)]
pub struct InMemoryWorldState {
    data: BTreeMap<String, Vec<u8>>,
    open_cursors: AtomicUsize,
    unavailable: bool,
    writes_failing: bool,
}

impl InMemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `Unavailable`.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Make writes fail with an I/O error while reads keep working.
    pub fn set_writes_failing(&mut self, failing: bool) {
        self.writes_failing = failing;
    }

    /// Cursors handed out by `scan` and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Number of stored keys, index entries included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    fn check_available(&self) -> Result<(), WorldStateError> {
        if self.unavailable {
            return Err(WorldStateError::Unavailable);
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), WorldStateError> {
        self.check_available()?;
        if self.writes_failing {
            return Err(WorldStateError::Io {
                message: "simulated write failure".to_string(),
            });
        }
        Ok(())
    }
}

impl WorldState for InMemoryWorldState {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WorldStateError> {
        self.check_available()?;
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), WorldStateError> {
        self.atomic_batch_write(vec![StateWrite::put(key, value)])
    }

    fn delete(&mut self, key: &str) -> Result<(), WorldStateError> {
        self.atomic_batch_write(vec![StateWrite::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<StateWrite>) -> Result<(), WorldStateError> {
        self.check_writable()?;
        validate_batch(&operations)?;
        apply_batch(&mut self.data, operations);
        Ok(())
    }

    fn scan(&self, start: &str, end: Option<&str>) -> Result<StateCursor<'_>, WorldStateError> {
        self.check_available()?;
        let cursor = BTreeCursor::new(&self.data, start, end, Some(&self.open_cursors));
        Ok(Box::new(cursor))
    }
}

/// Reject the whole batch if any key is empty.
pub(crate) fn validate_batch(operations: &[StateWrite]) -> Result<(), WorldStateError> {
    if operations.iter().any(|op| op.key().is_empty()) {
        return Err(WorldStateError::InvalidKey {
            reason: "key must not be empty".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn apply_batch(data: &mut BTreeMap<String, Vec<u8>>, operations: Vec<StateWrite>) {
    for op in operations {
        match op {
            StateWrite::Put { key, value } => {
                data.insert(key, value);
            }
            StateWrite::Delete { key } => {
                data.remove(&key);
            }
        }
    }
}

/// Lazy cursor over a borrowed ordered map.
pub(crate) struct BTreeCursor<'a> {
    range: Range<'a, String, Vec<u8>>,
    open_cursors: Option<&'a AtomicUsize>,
    closed: bool,
}

impl<'a> BTreeCursor<'a> {
    pub(crate) fn new(
        data: &'a BTreeMap<String, Vec<u8>>,
        start: &str,
        end: Option<&str>,
        open_cursors: Option<&'a AtomicUsize>,
    ) -> Self {
        // BTreeMap::range panics on an inverted interval
        let end = match end {
            Some(end) if end < start => Bound::Excluded(start),
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        let range = data.range::<str, _>((Bound::Included(start), end));
        if let Some(counter) = open_cursors {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Self {
            range,
            open_cursors,
            closed: false,
        }
    }
}

impl Iterator for BTreeCursor<'_> {
    type Item = Result<StateEntry, WorldStateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.range.next().map(|(key, value)| {
            Ok(StateEntry {
                key: key.clone(),
                value: value.clone(),
            })
        })
    }
}

impl StateQueryIterator for BTreeCursor<'_> {
    fn close(&mut self) -> Result<(), WorldStateError> {
        if !self.closed {
            self.closed = true;
            if let Some(counter) = self.open_cursors {
                counter.fetch_sub(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}
