use std::{
    fs::{File, OpenOptions},
    io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::LockError;

/// Advisory exclusive lock serializing reconciliation passes.
///
/// Held for as long as the value lives; the kernel drops the `flock` when the file closes,
/// including when the process dies.
#[derive(Debug)]
pub struct PassLock {
    path: PathBuf,
    _file: File,
}

impl PassLock {
    /// Take the lock without blocking. [`LockError::Held`] if another pass owns it.
    pub fn try_acquire(path: &Path) -> Result<Self, LockError> {
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(io_err)?;

        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(code) if code == libc::EWOULDBLOCK => Err(LockError::Held(path.to_path_buf())),
                _ => Err(io_err(err)),
            };
        }

        debug!(path = %path.display(), "pass lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
