use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Why a single path could not be deleted.
#[derive(Debug, Error)]
pub enum DeleteError {
  /// Another process holds the file open or locked.
  #[error("Can't delete `{}`. It's locked by {holder}", .path.display())]
  Locked { path: PathBuf, holder: String },

  /// Any other I/O failure (missing path, permission denied, ...).
  #[error("Can't delete `{}`. {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The directory tree could not be traversed.
  #[error("Can't delete `{}`. {source}", .path.display())]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

impl DeleteError {
  pub fn path(&self) -> &PathBuf {
    match self {
      DeleteError::Locked { path, .. } | DeleteError::Io { path, .. } | DeleteError::Walk { path, .. } => path,
    }
  }

  pub fn is_locked(&self) -> bool {
    matches!(self, DeleteError::Locked { .. })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteStatus {
  Ok,
  Error,
}

/// Outcome of a delete helper.
///
/// `status` is `Error` exactly when `message` is non-empty; every message
/// line names the path it is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
  status: DeleteStatus,
  message: String,
  locked: Vec<PathBuf>,
}

impl DeleteResult {
  pub fn ok() -> Self {
    Self {
      status: DeleteStatus::Ok,
      message: String::new(),
      locked: Vec::new(),
    }
  }

  /// Fold per-path failures into one result; no failures means `Ok`.
  pub fn from_errors(errors: &[DeleteError]) -> Self {
    let message = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
    let locked = errors
      .iter()
      .filter(|e| e.is_locked())
      .map(|e| e.path().clone())
      .collect();

    Self {
      status: if message.is_empty() {
        DeleteStatus::Ok
      } else {
        DeleteStatus::Error
      },
      message,
      locked,
    }
  }

  pub fn status(&self) -> DeleteStatus {
    self.status
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn is_ok(&self) -> bool {
    self.status == DeleteStatus::Ok
  }

  /// True if at least one path was refused because it was locked.
  pub fn is_locked(&self) -> bool {
    !self.locked.is_empty()
  }

  pub fn locked_paths(&self) -> &[PathBuf] {
    &self.locked
  }

  /// Combine two results, keeping every message.
  pub fn merge(mut self, other: DeleteResult) -> Self {
    if !other.message.is_empty() {
      if !self.message.is_empty() {
        self.message.push('\n');
      }
      self.message.push_str(&other.message);
      self.status = DeleteStatus::Error;
    }
    self.locked.extend(other.locked);
    self
  }
}

impl From<Result<(), DeleteError>> for DeleteResult {
  fn from(result: Result<(), DeleteError>) -> Self {
    match result {
      Ok(()) => DeleteResult::ok(),
      Err(err) => DeleteResult::from_errors(&[err]),
    }
  }
}
