//! Single-instance guard.
//!
//! An exclusive, non-blocking `flock` on a fixed path.  The guard is owned
//! by `main`; dropping it (normal exit, window close, or a handled signal)
//! unlocks and unlinks the file.

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Errors from acquiring the instance lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("failed to open lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("another instance holds {0}")]
    Held(PathBuf),
    #[error("flock on {path} failed: {errno}")]
    Flock { path: PathBuf, errno: Errno },
}

const ACQUIRE_ATTEMPTS: usize = 8;

/// Held exclusive lock.  Released on drop.
pub struct InstanceLock {
    path: PathBuf,
    lock: Option<Flock<File>>,
}

impl InstanceLock {
    /// Take the lock at `path`, creating the file if needed.
    ///
    /// A lock only counts if the locked inode is still the one at `path`;
    /// a holder that released (and unlinked) in between forces a retry.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let path = path.as_ref().to_path_buf();
        for _ in 0..ACQUIRE_ATTEMPTS {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)
                .map_err(|source| LockError::Io {
                    path: path.clone(),
                    source,
                })?;

            if let Some(lock) = lock_if_current(file, &path)? {
                debug!("acquired {}", path.display());
                return Ok(Self {
                    path,
                    lock: Some(lock),
                });
            }
            debug!("{} was replaced while locking, retrying", path.display());
        }
        Err(LockError::Held(path))
    }

    /// Whether some other open file description holds the lock at `path`.
    ///
    /// A missing file means nobody is running.
    pub fn is_held(path: impl AsRef<Path>) -> bool {
        let Ok(file) = File::open(path.as_ref()) else {
            return false;
        };
        matches!(
            Flock::lock(file, FlockArg::LockExclusiveNonblock),
            Err((_, Errno::EWOULDBLOCK))
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and unlink.  Idempotent.
    pub fn release(&mut self) {
        let Some(lock) = self.lock.take() else {
            return;
        };
        if let Err((_, errno)) = lock.unlock() {
            warn!("unlock {} failed: {}", self.path.display(), errno);
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("remove {}: {}", self.path.display(), e);
        }
        debug!("released {}", self.path.display());
    }
}

/// Lock `file`, keeping the lock only while `path` still names it.
fn lock_if_current(file: File, path: &Path) -> Result<Option<Flock<File>>, LockError> {
    let lock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(lock) => lock,
        Err((_, Errno::EWOULDBLOCK)) => return Err(LockError::Held(path.to_path_buf())),
        Err((_, errno)) => {
            return Err(LockError::Flock {
                path: path.to_path_buf(),
                errno,
            })
        }
    };
    Ok(same_file(&lock, path).then_some(lock))
}

fn same_file(file: &File, path: &Path) -> bool {
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(named)) => held.dev() == named.dev() && held.ino() == named.ino(),
        _ => false,
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}
