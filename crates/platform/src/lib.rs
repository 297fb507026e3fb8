//! Platform introspection for faktory
//!
//! This crate answers OS-level questions the build helpers need when a
//! filesystem operation is refused:
//! - Which processes hold a lock on a file
//! - What those processes are called

mod error;
mod locks;
mod process;

pub use error::PlatformError;
pub use locks::{LockEntry, LockHolder, describe_holders, lock_holders, parse_lock_table};
pub use process::process_name;
