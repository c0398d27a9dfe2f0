//! Advisory file lock serializing store rebuilds across processes.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};

/// Exclusive lock on `<store>.lock`, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    lock_file: File,
    lock_path: PathBuf,
}

impl StoreLock {
    /// Lock file guarding `store_path`.
    pub fn path_for(store_path: &Path) -> PathBuf {
        let mut name = store_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Try to acquire lock without blocking
    pub fn try_acquire(store_path: &Path) -> Result<Option<Self>> {
        let lock_path = Self::path_for(store_path);
        let lock_file = Self::open(&lock_path)?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                debug!("Store lock held by another process");
                return Ok(None);
            }
            Err(e) => {
                return Err(SearchError::LockFailed(format!("try acquire lock: {e}")));
            }
        }

        Ok(Some(Self {
            lock_file,
            lock_path,
        }))
    }

    /// Acquire with timeout (polling)
    pub fn acquire_timeout(store_path: &Path, timeout: Duration) -> Result<Self> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(25);

        loop {
            if let Some(lock) = Self::try_acquire(store_path)? {
                return Ok(lock);
            }
            if start.elapsed() >= timeout {
                warn!("Timeout waiting for store lock after {:?}", start.elapsed());
                return Err(SearchError::LockFailed(format!(
                    "timed out after {timeout:?} waiting for {}",
                    Self::path_for(store_path).display()
                )));
            }
            std::thread::sleep(poll_interval);
        }
    }

    fn open(lock_path: &Path) -> Result<File> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| SearchError::LockFailed(format!("open lock file: {e}")))
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            debug!("Failed to release store lock: {}", e);
        }
        debug!("Released store lock at {:?}", self.lock_path);
    }
}
