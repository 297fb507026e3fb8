//! Detecting files held by another process.
//!
//! Unix lets a locked file be unlinked, so the lock has to be probed before
//! removal. Two independent lock families exist there: whole-file `flock`
//! locks and `fcntl`/`lockf` record locks. The probe tries a non-blocking
//! exclusive lock of each kind; one that would block means someone else holds
//! the file. Record locks are probed with open file description locks, which
//! conflict with every record lock, including those of this process. Only
//! regular files are opened, and never in blocking mode.
//!
//! On Windows an open handle without delete sharing is what blocks removal,
//! so the probe opens the file exclusively and treats a sharing or lock
//! violation as locked; removal errors are classified the same way.

use std::io;
use std::path::Path;

use tracing::debug;

use super::types::DeleteError;

/// Fail with [`DeleteError::Locked`] if another holder has `path` locked.
///
/// Anything that prevents probing (unreadable file, filesystem without lock
/// support, a path that is not a regular file) is left for the removal to
/// report.
#[cfg(unix)]
pub(crate) fn ensure_unlocked(path: &Path) -> Result<(), DeleteError> {
  use rustix::fs::{FlockOperation, flock};

  match std::fs::symlink_metadata(path) {
    Ok(meta) if meta.file_type().is_file() => {}
    _ => return Ok(()),
  }

  // The probe descriptor must be closed before holders are looked up, or
  // this process would show up among them.
  let held = {
    let Some((fd, writable)) = open_for_probe(path) else {
      return Ok(());
    };
    record_lock_held(path, &fd, writable)
      || contended(path, "flock", flock(&fd, FlockOperation::NonBlockingLockExclusive))
  };

  if held { Err(locked(path)) } else { Ok(()) }
}

/// Open `path` without blocking, read-write when permitted.
#[cfg(unix)]
fn open_for_probe(path: &Path) -> Option<(rustix::fd::OwnedFd, bool)> {
  use rustix::fs::{Mode, OFlags, open};

  let flags = OFlags::NONBLOCK | OFlags::NOCTTY | OFlags::CLOEXEC;
  if let Ok(fd) = open(path, OFlags::RDWR | flags, Mode::empty()) {
    return Some((fd, true));
  }

  match open(path, OFlags::RDONLY | flags, Mode::empty()) {
    Ok(fd) => Some((fd, false)),
    Err(errno) => {
      debug!(path = ?path, error = %io::Error::from(errno), "cannot open for lock probe, attempting removal anyway");
      None
    }
  }
}

/// Probe for `fcntl`/`lockf` record locks.
///
/// An exclusive record lock needs a writable descriptor; without one the
/// kernel lock table is consulted instead.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn record_lock_held(path: &Path, fd: &rustix::fd::OwnedFd, writable: bool) -> bool {
  use rustix::fs::{FlockOperation, fcntl_lock};

  if writable {
    return contended(path, "fcntl", fcntl_lock(fd, FlockOperation::NonBlockingLockExclusive));
  }

  match faktory_platform::lock_holders(path) {
    Ok(holders) => !holders.is_empty(),
    Err(e) => {
      debug!(path = ?path, error = %e, "cannot read lock table, attempting removal anyway");
      false
    }
  }
}

/// Process-associated record locks are dropped when any descriptor of the
/// process closes the file, so they are not probed here.
#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
fn record_lock_held(_path: &Path, _fd: &rustix::fd::OwnedFd, _writable: bool) -> bool {
  false
}

/// True if a non-blocking lock attempt failed because of a conflicting lock.
#[cfg(unix)]
fn contended(path: &Path, kind: &str, result: rustix::io::Result<()>) -> bool {
  use rustix::io::Errno;

  match result {
    Ok(()) => false,
    Err(errno) if errno == Errno::WOULDBLOCK || errno == Errno::AGAIN || errno == Errno::ACCESS => true,
    Err(errno) => {
      debug!(path = ?path, kind, error = %io::Error::from(errno), "lock probe failed, attempting removal anyway");
      false
    }
  }
}

#[cfg(windows)]
pub(crate) fn ensure_unlocked(path: &Path) -> Result<(), DeleteError> {
  use std::os::windows::fs::OpenOptionsExt;

  match std::fs::OpenOptions::new().read(true).share_mode(0).open(path) {
    Err(err) if is_lock_violation(&err) => Err(locked(path)),
    _ => Ok(()),
  }
}

/// Turn a removal failure into a [`DeleteError`].
pub(crate) fn classify(path: &Path, source: io::Error) -> DeleteError {
  if is_lock_violation(&source) {
    return locked(path);
  }

  DeleteError::Io {
    path: path.to_path_buf(),
    source,
  }
}

fn locked(path: &Path) -> DeleteError {
  let holders = faktory_platform::lock_holders(path).unwrap_or_else(|e| {
    debug!(path = ?path, error = %e, "could not identify lock holder");
    Vec::new()
  });

  DeleteError::Locked {
    path: path.to_path_buf(),
    holder: faktory_platform::describe_holders(&holders),
  }
}

#[cfg(unix)]
fn is_lock_violation(_err: &io::Error) -> bool {
  false
}

#[cfg(windows)]
fn is_lock_violation(err: &io::Error) -> bool {
  use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, ERROR_SHARING_VIOLATION};

  matches!(
    err.raw_os_error().map(|code| code as u32),
    Some(ERROR_SHARING_VIOLATION) | Some(ERROR_LOCK_VIOLATION)
  )
}
