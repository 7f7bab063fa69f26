//! # Entry Lock
//!
//! Exclusive advisory lock on a cache entry's sidecar file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use same_file::Handle;
use tracing::{debug, warn};

/// Suffix of the sidecar file guarding a cache entry
pub const LOCK_EXTENSION: &str = "lock";

/// Sidecar lock path for a cache entry (`cached_<hash>.lock`)
pub fn lock_path_for(target: &Path) -> PathBuf {
    target.with_extension(LOCK_EXTENSION)
}

/// Held lock on a sidecar file.
///
/// Dropping the guard removes the sidecar first and then closes the handle,
/// which releases the lock.
pub(crate) struct EntryLock {
    path: PathBuf,
    handle: Option<Handle>,
}

/// Outcome of locking an already opened sidecar handle
enum Attempt {
    Held(EntryLock),
    Contended,
    /// The handle was locked, but the path no longer names the same file
    Stale,
}

impl EntryLock {
    /// Try to take the lock without blocking.
    ///
    /// Returns `Ok(None)` when another handle holds it. A lock won on a
    /// sidecar that its previous owner already unlinked is discarded and
    /// the sidecar is reopened.
    pub(crate) fn try_acquire(path: &Path) -> io::Result<Option<Self>> {
        loop {
            match Self::lock_opened(open_sidecar(path)?, path)? {
                Attempt::Held(lock) => return Ok(Some(lock)),
                Attempt::Contended => return Ok(None),
                Attempt::Stale => {
                    debug!(path = ?path, "Lock file was replaced while locking, retrying");
                }
            }
        }
    }

    fn lock_opened(file: File, path: &Path) -> io::Result<Attempt> {
        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                debug!(path = ?path, "Cache entry lock is held elsewhere");
                return Ok(Attempt::Contended);
            }
            Err(e) => return Err(e),
        }

        let held = Handle::from_file(file)?;
        match Handle::from_path(path) {
            Ok(current) if current == held => {
                debug!(path = ?path, "Acquired cache entry lock");
                Ok(Attempt::Held(Self {
                    path: path.to_path_buf(),
                    handle: Some(held),
                }))
            }
            Ok(_) => Ok(Attempt::Stale),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Attempt::Stale),
            Err(e) => Err(e),
        }
    }
}

impl Drop for EntryLock {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?self.path, error = %e, "Failed to remove lock file"),
        }
        drop(self.handle.take());
    }
}

fn open_sidecar(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
