//! File lock holder detection
//!
//! On Linux the kernel publishes every active file lock in `/proc/locks`:
//!
//! ```text
//! 1: FLOCK  ADVISORY  WRITE 4242 08:01:1311 0 EOF
//! 2: POSIX  ADVISORY  READ  1717 00:2f:98765 0 EOF
//! 2: -> POSIX  ADVISORY  WRITE 1818 00:2f:98765 0 EOF
//! ```
//!
//! Entries are matched against a file's device and inode numbers. Lines
//! marked `->` are waiters, not holders. Other platforms offer no cheap
//! equivalent, so lookups there return no holders.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::PlatformError;
#[cfg(target_os = "linux")]
use crate::process::process_name;

/// One holder entry from the kernel lock table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// Lock flavour (`FLOCK`, `POSIX`, `OFDLCK`, ...)
    pub kind: String,
    /// Owning PID; `-1` for open file description locks
    pub pid: i64,
    pub major: u32,
    pub minor: u32,
    pub inode: u64,
}

/// A process holding a lock on a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockHolder {
    pub pid: u32,
    pub name: Option<String>,
}

impl fmt::Display for LockHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "process `{}` (PID {})", name, self.pid),
            None => write!(f, "PID {}", self.pid),
        }
    }
}

/// Render a holder list for a diagnostic message.
///
/// Falls back to a generic note when no holder could be identified.
pub fn describe_holders(holders: &[LockHolder]) -> String {
    if holders.is_empty() {
        return "another process".to_string();
    }

    holders
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse the contents of `/proc/locks`, keeping only holder entries.
pub fn parse_lock_table(contents: &str) -> Result<Vec<LockEntry>, PlatformError> {
    let mut entries = Vec::new();

    for line in contents.lines() {
        let mut fields = line.split_whitespace().skip(1).peekable();
        if fields.peek().is_none() {
            continue;
        }
        if fields.peek() == Some(&"->") {
            continue;
        }

        let fields: Vec<&str> = fields.collect();
        // kind, class, mode, pid, dev:inode, start, end
        if fields.len() < 5 {
            return Err(PlatformError::MalformedEntry(line.to_string()));
        }

        let malformed = || PlatformError::MalformedEntry(line.to_string());
        let pid = fields[3].parse::<i64>().map_err(|_| malformed())?;

        let mut id = fields[4].split(':');
        let (Some(major), Some(minor), Some(inode), None) = (id.next(), id.next(), id.next(), id.next()) else {
            return Err(malformed());
        };

        entries.push(LockEntry {
            kind: fields[0].to_string(),
            pid,
            major: u32::from_str_radix(major, 16).map_err(|_| malformed())?,
            minor: u32::from_str_radix(minor, 16).map_err(|_| malformed())?,
            inode: inode.parse().map_err(|_| malformed())?,
        });
    }

    Ok(entries)
}

/// Find the processes currently holding a lock on `path`.
///
/// This is best-effort: an empty list means no holder could be identified,
/// not that the file is unlocked.
#[cfg(target_os = "linux")]
pub fn lock_holders(path: &Path) -> Result<Vec<LockHolder>, PlatformError> {
    use std::os::unix::fs::MetadataExt;

    let metadata = std::fs::metadata(path).map_err(|source| PlatformError::Metadata {
        path: path.display().to_string(),
        source,
    })?;
    let (major, minor) = split_device(metadata.dev());
    let inode = metadata.ino();

    let table = std::fs::read_to_string("/proc/locks").map_err(PlatformError::LockTable)?;

    let mut holders: Vec<LockHolder> = Vec::new();
    for entry in parse_lock_table(&table)? {
        if entry.major != major || entry.minor != minor || entry.inode != inode {
            continue;
        }
        let Ok(pid) = u32::try_from(entry.pid) else {
            continue;
        };
        if pid == 0 || holders.iter().any(|h| h.pid == pid) {
            continue;
        }

        holders.push(LockHolder {
            pid,
            name: process_name(pid),
        });
    }

    debug!(path = ?path, count = holders.len(), "resolved lock holders");
    Ok(holders)
}

#[cfg(not(target_os = "linux"))]
pub fn lock_holders(path: &Path) -> Result<Vec<LockHolder>, PlatformError> {
    debug!(path = ?path, "lock holder lookup unsupported on this platform");
    Ok(Vec::new())
}

/// Decode a userspace `st_dev` into the kernel's major/minor pair.
#[cfg(target_os = "linux")]
fn split_device(dev: u64) -> (u32, u32) {
    let major = ((dev >> 32) & 0xffff_f000) | ((dev >> 8) & 0x0000_0fff);
    let minor = ((dev >> 12) & 0xffff_ff00) | (dev & 0x0000_00ff);
    (major as u32, minor as u32)
}
