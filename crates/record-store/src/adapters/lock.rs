//! # Data Directory Lock
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). The OS drops the lock when the holder exits, so a crashed
//! runtime never leaves the directory locked.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::errors::WorldStateError;

/// Errors from data directory locking
#[derive(Debug)]
pub enum LockError {
    /// Lock file could not be created
    CreateFailed(io::Error),
    /// Directory is already locked by another holder
    AlreadyLocked { path: PathBuf },
    /// Failed to write PID to lock file
    WriteFailed(io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::CreateFailed(e) => write!(f, "Failed to create lock file: {}", e),
            LockError::AlreadyLocked { path } => {
                write!(f, "Data directory already in use ({})", path.display())
            }
            LockError::WriteFailed(e) => write!(f, "Failed to write PID to lock file: {}", e),
        }
    }
}

impl std::error::Error for LockError {}

impl From<LockError> for WorldStateError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::AlreadyLocked { .. } => WorldStateError::Locked {
                message: err.to_string(),
            },
            other => WorldStateError::Io {
                message: other.to_string(),
            },
        }
    }
}

/// Exclusive lock on a data directory.
///
/// Acquired when a file-backed world state opens, released on drop (RAII).
pub struct DataDirLock {
    /// Kept open to hold the lock
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Try once to lock `data_dir`. Does not wait for another holder.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        let path = data_dir.join(Self::LOCK_FILE);

        // Truncation waits until the lock is ours so a live holder's PID survives
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked { path });
        }

        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{}", std::process::id()).map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let dir = tempfile::tempdir().unwrap();

        let lock = DataDirLock::acquire(dir.path()).unwrap();
        assert!(lock.path().exists());

        let second = DataDirLock::acquire(dir.path());
        assert!(matches!(second, Err(LockError::AlreadyLocked { .. })));

        drop(lock);
        assert!(DataDirLock::acquire(dir.path()).is_ok());
    }

    #[test]
    fn test_lock_error_maps_to_locked() {
        let err: WorldStateError = LockError::AlreadyLocked {
            path: PathBuf::from("/tmp/x/LOCK"),
        }
        .into();
        assert!(matches!(err, WorldStateError::Locked { .. }));
    }
}
