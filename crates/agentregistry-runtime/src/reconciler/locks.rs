//! One reconciliation at a time per working directory.
//!
//! Two layers: an in-process async mutex per directory, so tasks of one
//! process queue without touching the filesystem, and an exclusive advisory
//! lock on `<dir>/.arctl.lock`, so separate `Reconciler` values and separate
//! processes exclude each other too.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock file inside the runtime working directory.
pub const LOCK_FILE_NAME: &str = ".arctl.lock";

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(unix)]
type FileLock = nix::fcntl::Flock<File>;

// Advisory locking is unix-only; elsewhere only the in-process lock applies.
#[cfg(not(unix))]
type FileLock = File;

/// Held while a directory is being reconciled. Dropping it releases both
/// layers.
pub struct WorkdirGuard {
    _file: FileLock,
    _local: OwnedMutexGuard<()>,
}

/// Registry of per-directory async locks.
///
/// Sharing one instance between reconcilers avoids polling the lock file
/// while another task of the same process holds it.
#[derive(Debug, Default)]
pub struct WorkdirLocks {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl WorkdirLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, working_dir: &Path) -> Arc<AsyncMutex<()>> {
        let key = std::path::absolute(working_dir).unwrap_or_else(|_| working_dir.to_path_buf());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Held guards and waiters keep a clone; a lone map reference is idle.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(key).or_default())
    }

    /// Wait until `working_dir` is free and hold it until the guard drops.
    ///
    /// Creates the directory and its lock file when missing.
    pub async fn acquire(&self, working_dir: &Path) -> io::Result<WorkdirGuard> {
        let local = self.lock_for(working_dir).lock_owned().await;
        tokio::fs::create_dir_all(working_dir).await?;
        let file = lock_file(&working_dir.join(LOCK_FILE_NAME)).await?;
        Ok(WorkdirGuard {
            _file: file,
            _local: local,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
}

#[cfg(unix)]
async fn lock_file(path: &Path) -> io::Result<FileLock> {
    use nix::errno::Errno;
    use nix::fcntl::{Flock, FlockArg};

    let mut file = open_lock_file(path)?;
    loop {
        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => return Ok(lock),
            Err((returned, errno)) if errno == Errno::EWOULDBLOCK => {
                file = returned;
                tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
            }
            Err((_, errno)) => return Err(io::Error::from(errno)),
        }
    }
}

#[cfg(not(unix))]
async fn lock_file(path: &Path) -> io::Result<FileLock> {
    let _ = LOCK_RETRY_INTERVAL;
    open_lock_file(path)
}
