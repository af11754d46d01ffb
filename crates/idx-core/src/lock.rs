//! The exclusive file lock guarding the single-writer invariant (spec §5).

use fs2::FileExt;
use idx_util::errors::IndexerError;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Holds an exclusive advisory lock on `<index_dir>/write.lock` for the
/// lifetime of the indexing context's writer. Dropping it releases the
/// lock; a second writer attempting to acquire it while held fails fast
/// with [`IndexerError::LockObtainFailed`] rather than blocking.
pub struct WriteLock {
    _file: File,
    path: PathBuf,
}

impl WriteLock {
    pub fn acquire(index_dir: &Path) -> Result<Self, IndexerError> {
        std::fs::create_dir_all(index_dir)?;
        let path = index_dir.join("write.lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive().map_err(|_| IndexerError::LockObtainFailed {
            message: format!("index directory already locked by another writer: {}", path.display()),
        })?;
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self._file);
    }
}
