//! Delete helpers for build recipes.
//!
//! Every helper returns a [`DeleteResult`] instead of an error: missing
//! paths, permission problems, and files locked by another process all end up
//! in the result message, one line per offending path. A locked file is
//! reported as ``Can't delete `<path>`. It's locked by <holder>`` where the
//! holder is identified when the platform allows it.

mod lock;
mod types;

pub use types::{DeleteError, DeleteResult, DeleteStatus};

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Delete a single file.
pub fn delete_file(path: impl AsRef<Path>) -> DeleteResult {
  let path = path.as_ref();
  let result = remove_file(path);
  if let Err(e) = &result {
    warn!(path = ?path, error = %e, "failed to delete file");
  }
  result.into()
}

/// Delete every path, continuing past failures.
///
/// The result is `Ok` only if every file was deleted; otherwise its message
/// holds one line per failed path, in input order.
pub fn delete_files<I, P>(paths: I) -> DeleteResult
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  let mut errors = Vec::new();
  let mut deleted = 0usize;

  for path in paths {
    match remove_file(path.as_ref()) {
      Ok(()) => deleted += 1,
      Err(e) => {
        warn!(path = ?path.as_ref(), error = %e, "failed to delete file");
        errors.push(e);
      }
    }
  }

  debug!(deleted, failed = errors.len(), "deleted files");
  DeleteResult::from_errors(&errors)
}

/// Delete a directory and everything under it.
///
/// The tree is checked for locked files first; if any are found nothing is
/// removed and each locked file is reported.
pub fn delete_directory(path: impl AsRef<Path>) -> DeleteResult {
  let path = path.as_ref();

  let mut errors = Vec::new();
  for entry in WalkDir::new(path) {
    let entry = match entry {
      Ok(entry) => entry,
      Err(source) => {
        errors.push(DeleteError::Walk {
          path: source.path().unwrap_or(path).to_path_buf(),
          source,
        });
        continue;
      }
    };

    if entry.file_type().is_file()
      && let Err(e) = lock::ensure_unlocked(entry.path())
    {
      errors.push(e);
    }
  }

  if errors.is_empty()
    && let Err(source) = fs::remove_dir_all(path)
  {
    errors.push(lock::classify(path, source));
  }

  if errors.is_empty() {
    debug!(path = ?path, "deleted directory");
  } else {
    warn!(path = ?path, failed = errors.len(), "failed to delete directory");
  }

  DeleteResult::from_errors(&errors)
}

fn remove_file(path: &Path) -> Result<(), DeleteError> {
  lock::ensure_unlocked(path)?;
  fs::remove_file(path).map_err(|source| lock::classify(path, source))?;
  debug!(path = ?path, "deleted file");
  Ok(())
}
