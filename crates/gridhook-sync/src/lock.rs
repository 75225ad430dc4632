//! Per-document mutual exclusion with a bounded wait.
//!
//! A [`DocumentLock`] always serializes cycles within the process. When it is
//! given a lock file it also takes an exclusive OS lock on that file, which
//! serializes cycles across processes sharing the same document state.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// How often a contended lock file is retried.
const LOCK_FILE_POLL: Duration = Duration::from_millis(20);

/// Exclusive lock for one document. Clones share the same lock.
#[derive(Clone, Debug)]
pub struct DocumentLock {
    document: Arc<str>,
    inner: Arc<AsyncMutex<()>>,
    lock_file: Option<Arc<Path>>,
}

impl DocumentLock {
    /// An in-process lock only.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: Arc::from(document.into()),
            inner: Arc::new(AsyncMutex::new(())),
            lock_file: None,
        }
    }

    /// A lock that also holds an OS lock on `path` while acquired.
    ///
    /// Every process working on the same document must use the same path.
    /// The file is created on first acquire; its parent must exist.
    pub fn with_lock_file(document: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            lock_file: Some(Arc::from(path.into())),
            ..Self::new(document)
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn lock_file(&self) -> Option<&Path> {
        self.lock_file.as_deref()
    }

    /// Wait up to `timeout` for the lock.
    ///
    /// On timeout nothing is held and [`SyncError::LockTimeout`] is returned;
    /// the attempt is not retried.
    pub async fn acquire(&self, timeout: Duration) -> SyncResult<DocumentGuard> {
        match tokio::time::timeout(timeout, self.lock()).await {
            Ok(result) => {
                let guard = result?;
                debug!(document = %self.document, "document lock acquired");
                Ok(guard)
            }
            Err(_) => Err(SyncError::LockTimeout {
                document: self.document.to_string(),
                waited: timeout,
            }),
        }
    }

    /// Take the lock only if it is free right now.
    pub fn try_acquire(&self) -> SyncResult<Option<DocumentGuard>> {
        let Ok(guard) = Arc::clone(&self.inner).try_lock_owned() else {
            return Ok(None);
        };
        let file = match &self.lock_file {
            Some(path) => match try_lock_file(path)? {
                Some(file) => Some(file),
                None => return Ok(None),
            },
            None => None,
        };
        Ok(Some(self.guard(guard, file)))
    }

    /// Returns `true` if a guard from this lock (or a clone) is alive in
    /// this process.
    pub fn is_locked(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    async fn lock(&self) -> SyncResult<DocumentGuard> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        let file = match &self.lock_file {
            Some(path) => Some(lock_file(path).await?),
            None => None,
        };
        Ok(self.guard(guard, file))
    }

    fn guard(&self, guard: OwnedMutexGuard<()>, file: Option<File>) -> DocumentGuard {
        DocumentGuard {
            document: Arc::clone(&self.document),
            _file: file,
            _guard: guard,
        }
    }
}

/// Poll the OS lock on `path` until it is ours. Cancelled by the caller's
/// timeout.
async fn lock_file(path: &Path) -> SyncResult<File> {
    loop {
        if let Some(file) = try_lock_file(path)? {
            return Ok(file);
        }
        tokio::time::sleep(LOCK_FILE_POLL).await;
    }
}

fn try_lock_file(path: &Path) -> SyncResult<Option<File>> {
    let lock_err = |source| SyncError::LockFile {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(lock_err)?;
    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(Some(file)),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
        Err(e) => Err(lock_err(e)),
    }
}

/// Held document lock; released on drop.
#[derive(Debug)]
pub struct DocumentGuard {
    document: Arc<str>,
    // Closing the file releases the OS lock.
    _file: Option<File>,
    _guard: OwnedMutexGuard<()>,
}

impl DocumentGuard {
    pub fn document(&self) -> &str {
        &self.document
    }
}

impl Drop for DocumentGuard {
    fn drop(&mut self) {
        debug!(document = %self.document, "document lock released");
    }
}
