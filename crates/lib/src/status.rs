//! Status sinks for recipe runs.
//!
//! A run reports through two channels:
//! - the message log, recorded by a [`StatusSink`]
//! - live status updates, handed to the updater callback given at boot and
//!   mirrored to the sink
//!
//! Sinks impose no formatting on the messages they receive.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

/// Destination for recipe log messages and live status updates.
pub trait StatusSink: Send + Sync {
  fn log(&self, message: &str);

  fn update_status(&self, _status: &str) {}
}

/// Callback receiving live progress strings.
pub type StatusUpdater = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink that emits messages as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
  fn log(&self, message: &str) {
    info!("{}", message);
  }

  fn update_status(&self, status: &str) {
    debug!(status, "status update");
  }
}

/// Sink that records every message in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
  messages: Mutex<Vec<String>>,
  statuses: Mutex<Vec<String>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every logged message, oldest first.
  pub fn all_messages(&self) -> Vec<String> {
    self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Every status update, oldest first.
  pub fn all_statuses(&self) -> Vec<String> {
    self.statuses.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// True if some logged message equals `message` after trimming whitespace.
  pub fn contains(&self, message: &str) -> bool {
    self
      .messages
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .any(|m| m.trim() == message.trim())
  }

  pub fn clear(&self) {
    self.messages.lock().unwrap_or_else(PoisonError::into_inner).clear();
    self.statuses.lock().unwrap_or_else(PoisonError::into_inner).clear();
  }
}

impl StatusSink for MemorySink {
  fn log(&self, message: &str) {
    self
      .messages
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(message.to_string());
  }

  fn update_status(&self, status: &str) {
    self
      .statuses
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(status.to_string());
  }
}

/// The sink and updater wired into one run.
#[derive(Clone)]
pub struct Status {
  sink: Arc<dyn StatusSink>,
  updater: StatusUpdater,
}

impl Status {
  pub fn new(sink: Arc<dyn StatusSink>, updater: StatusUpdater) -> Self {
    Self { sink, updater }
  }

  pub fn log(&self, message: &str) {
    self.sink.log(message);
  }

  pub fn update(&self, status: &str) {
    (self.updater)(status);
    self.sink.update_status(status);
  }
}

impl std::fmt::Debug for Status {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Status").finish_non_exhaustive()
  }
}
