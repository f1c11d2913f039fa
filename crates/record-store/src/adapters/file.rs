use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::lock::DataDirLock;
use super::memory::{apply_batch, validate_batch, BTreeCursor};
use crate::domain::errors::WorldStateError;
use crate::ports::outbound::{StateCursor, StateWrite, WorldState};

/// File-backed world state for running without a ledger peer.
///
/// The whole state lives in memory and is rewritten to one file on every
/// mutation (temp file + rename), so a batch is either fully on disk or not at
/// all. The data directory is locked for the lifetime of the value.
///
/// File layout:
///
/// ```text
/// "TXLW" | version:u16 | count:u32 | ([key_len:u32][key][value_len:u32][value])* | crc32:u32
/// ```
///
/// Integers are little-endian. The CRC covers every byte before it.
pub struct FileBackedWorldState {
    data: BTreeMap<String, Vec<u8>>,
    path: PathBuf,
    _lock: DataDirLock,
}

const STATE_FILE: &str = "world_state.bin";
const MAGIC: &[u8; 4] = b"TXLW";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4;
const CRC_LEN: usize = 4;

impl FileBackedWorldState {
    /// Open (or create) the world state kept in `data_dir`.
    ///
    /// ## Errors
    ///
    /// - `Locked`: another process has the directory open
    /// - `Corruption`: the state file fails its checksum or is truncated
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, WorldStateError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(io_error)?;

        let lock = DataDirLock::acquire(data_dir)?;
        let path = data_dir.join(STATE_FILE);

        let data = match fs::read(&path) {
            Ok(bytes) => decode_state(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                #[cfg(feature = "tracing-log")]
                tracing::info!("[txl-store] 📁 No existing world state at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(io_error(e)),
        };

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[txl-store] 💾 Loaded {} keys from {}",
            data.len(),
            path.display()
        );

        Ok(Self {
            data,
            path,
            _lock: lock,
        })
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Persist `next`, then make it the live state.
    fn commit(&mut self, next: BTreeMap<String, Vec<u8>>) -> Result<(), WorldStateError> {
        let bytes = encode_state(&next);

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        fs::rename(&temp_path, &self.path).map_err(io_error)?;

        self.data = next;
        Ok(())
    }
}

impl WorldState for FileBackedWorldState {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WorldStateError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), WorldStateError> {
        self.atomic_batch_write(vec![StateWrite::put(key, value)])
    }

    fn delete(&mut self, key: &str) -> Result<(), WorldStateError> {
        self.atomic_batch_write(vec![StateWrite::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<StateWrite>) -> Result<(), WorldStateError> {
        validate_batch(&operations)?;
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.commit(next)
    }

    fn scan(&self, start: &str, end: Option<&str>) -> Result<StateCursor<'_>, WorldStateError> {
        Ok(Box::new(BTreeCursor::new(&self.data, start, end, None)))
    }
}

fn io_error(e: io::Error) -> WorldStateError {
    WorldStateError::Io {
        message: e.to_string(),
    }
}

fn corruption(message: &str) -> WorldStateError {
    WorldStateError::Corruption {
        message: message.to_string(),
    }
}

fn encode_state(data: &BTreeMap<String, Vec<u8>>) -> Vec<u8> {
    let body_len: usize = data.iter().map(|(k, v)| 8 + k.len() + v.len()).sum();
    let mut bytes = Vec::with_capacity(HEADER_LEN + body_len + CRC_LEN);

    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
    for (key, value) in data {
        bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(key.as_bytes());
        bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
        bytes.extend_from_slice(value);
    }

    let crc = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes
}

fn decode_state(bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>, WorldStateError> {
    if bytes.len() < HEADER_LEN + CRC_LEN {
        return Err(corruption("state file truncated"));
    }

    let (body, crc_bytes) = bytes.split_at(bytes.len() - CRC_LEN);
    let expected = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let actual = crc32fast::hash(body);
    if expected != actual {
        return Err(WorldStateError::Corruption {
            message: format!(
                "state file checksum mismatch: expected {:08x}, got {:08x}",
                expected, actual
            ),
        });
    }

    if &body[..4] != MAGIC {
        return Err(corruption("not a world state file"));
    }

    let mut reader = Reader {
        bytes: body,
        cursor: 4,
    };
    let version = u16::from_le_bytes([body[4], body[5]]);
    reader.cursor += 2;
    if version != FORMAT_VERSION {
        return Err(WorldStateError::Corruption {
            message: format!("unsupported state file version {}", version),
        });
    }

    let count = reader.read_u32()?;
    let mut data = BTreeMap::new();
    for _ in 0..count {
        let key_len = reader.read_u32()? as usize;
        let key = reader.read_bytes(key_len)?;
        let key = String::from_utf8(key.to_vec()).map_err(|_| corruption("key is not UTF-8"))?;
        let value_len = reader.read_u32()? as usize;
        let value = reader.read_bytes(value_len)?.to_vec();
        data.insert(key, value);
    }

    if reader.cursor != body.len() {
        return Err(corruption("trailing bytes after last entry"));
    }
    Ok(data)
}

struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WorldStateError> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| corruption("entry runs past end of file"))?;
        let slice = &self.bytes[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, WorldStateError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut state = FileBackedWorldState::open(dir.path()).unwrap();
            assert!(state.is_empty());
            state.put("1", b"one").unwrap();
            state.put("2", b"two").unwrap();
            state.delete("1").unwrap();
        }

        let state = FileBackedWorldState::open(dir.path()).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("2").unwrap(), Some(b"two".to_vec()));
        assert_eq!(state.get("1").unwrap(), None);
    }

    #[test]
    fn test_second_open_is_locked() {
        let dir = tempfile::tempdir().unwrap();
        let _state = FileBackedWorldState::open(dir.path()).unwrap();

        let second = FileBackedWorldState::open(dir.path());
        assert!(matches!(second, Err(WorldStateError::Locked { .. })));
    }

    #[test]
    fn test_corrupted_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let mut state = FileBackedWorldState::open(dir.path()).unwrap();
            state.put("1", b"one").unwrap();
            state.path().to_path_buf()
        };

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 6;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        let reopened = FileBackedWorldState::open(dir.path());
        assert!(matches!(reopened, Err(WorldStateError::Corruption { .. })));
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), b"TXLW").unwrap();

        let opened = FileBackedWorldState::open(dir.path());
        assert!(matches!(opened, Err(WorldStateError::Corruption { .. })));
    }

    #[test]
    fn test_failed_batch_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = FileBackedWorldState::open(dir.path()).unwrap();
        state.put("1", b"one").unwrap();

        let ops = vec![StateWrite::delete("1"), StateWrite::put("", b"bad".to_vec())];
        assert!(state.atomic_batch_write(ops).is_err());
        assert_eq!(state.get("1").unwrap(), Some(b"one".to_vec()));
    }

    #[test]
    fn test_encoding_round_trip() {
        let mut data = BTreeMap::new();
        data.insert("a".to_string(), vec![1, 2, 3]);
        data.insert("\u{0}idx\u{0}a\u{0}".to_string(), vec![]);

        let decoded = decode_state(&encode_state(&data)).unwrap();
        assert_eq!(decoded, data);
    }
}
