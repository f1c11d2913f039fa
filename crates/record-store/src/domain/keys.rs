//! # World State Keys
//!
//! Simple keys hold primary records. Composite keys hold secondary index
//! entries and are laid out as:
//!
//! ```text
//! U+0000 namespace U+0000 part_1 U+0000 ... part_n U+0000
//! ```
//!
//! The leading U+0000 keeps every composite key below every simple key, so an
//! open-ended range scan (which starts at U+0001) never sees index entries.
//! Parts may not contain U+0000 or U+10FFFF, which makes
//! `prefix .. prefix + U+10FFFF` cover exactly the keys sharing `prefix`.

use crate::domain::errors::WorldStateError;

/// Marks the start of a composite key.
pub const COMPOSITE_KEY_NAMESPACE: &str = "\u{0000}";

/// Separator between composite key components.
pub const MIN_UNICODE_RUNE: char = '\u{0000}';

/// Upper bound for prefix scans. Never valid inside a key part.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Replaces an empty start bound on simple-key range scans.
pub const EMPTY_KEY_SUBSTITUTE: &str = "\u{0001}";

/// Secondary indexes maintained as composite keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeIndex {
    /// `location~name`: parts `[location, transaction_id]`.
    LocationName,
}

impl CompositeIndex {
    pub fn namespace(&self) -> &'static str {
        match self {
            CompositeIndex::LocationName => "location~name",
        }
    }
}

/// Namespace of the store's own bookkeeping entries.
///
/// Metadata keys are composite, so they never show up in record scans.
pub const METADATA_NAMESPACE: &str = "txl~meta";

/// Metadata entry holding the index policy the location index was built under.
pub const INDEX_POLICY_METADATA: &str = "index_policy";

/// Metadata entry holding the record schema version of the stored data.
pub const SCHEMA_VERSION_METADATA: &str = "schema_version";

/// Validate a simple (primary record) key.
pub fn validate_simple_key(key: &str) -> Result<(), WorldStateError> {
    if key.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    if key.starts_with(COMPOSITE_KEY_NAMESPACE) {
        return Err(invalid("key must not start with U+0000"));
    }
    Ok(())
}

/// Validate a key used both as a primary key and as an index key part.
pub fn validate_record_id(id: &str) -> Result<(), WorldStateError> {
    validate_simple_key(id)?;
    validate_key_part(id)
}

fn validate_key_part(part: &str) -> Result<(), WorldStateError> {
    if part.contains(MIN_UNICODE_RUNE) || part.contains(MAX_UNICODE_RUNE) {
        return Err(invalid(&format!(
            "key part {:?} contains U+0000 or U+10FFFF",
            part
        )));
    }
    Ok(())
}

/// Build a composite key from a namespace and ordered parts.
///
/// With fewer parts than the index defines, the result is a prefix suitable
/// for `partial_composite_key_scan`.
pub fn build_composite_key(namespace: &str, parts: &[&str]) -> Result<String, WorldStateError> {
    if namespace.is_empty() {
        return Err(invalid("composite key namespace must not be empty"));
    }
    validate_key_part(namespace)?;

    let mut key = String::with_capacity(
        2 + namespace.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>(),
    );
    key.push_str(COMPOSITE_KEY_NAMESPACE);
    key.push_str(namespace);
    key.push(MIN_UNICODE_RUNE);
    for part in parts {
        validate_key_part(part)?;
        key.push_str(part);
        key.push(MIN_UNICODE_RUNE);
    }
    Ok(key)
}

/// Exclusive upper bound for a prefix scan.
pub fn prefix_end(prefix: &str) -> String {
    let mut end = String::with_capacity(prefix.len() + 4);
    end.push_str(prefix);
    end.push(MAX_UNICODE_RUNE);
    end
}

fn invalid(reason: &str) -> WorldStateError {
    WorldStateError::InvalidKey {
        reason: reason.to_string(),
    }
}
