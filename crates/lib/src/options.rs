//! Recipe options parsed from a raw parameter string.
//!
//! The raw string is a whitespace-separated list of tokens:
//! - `key=value` sets `key` to `value` (only the first `=` splits)
//! - `key` marks `key` as present without a value
//!
//! Insertion order is kept; it is part of the `Options: [...]` echo printed
//! before a task chain runs. A repeated key keeps the position of its first
//! occurrence and takes the value of its last.

use std::fmt;

use tracing::debug;

use crate::consts::OPTIONS_ENV;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
  entries: Vec<(String, Option<String>)>,
}

impl Options {
  pub fn parse(raw: &str) -> Self {
    let mut options = Options::default();

    for token in raw.split_whitespace() {
      let (key, value) = match token.split_once('=') {
        Some((key, value)) => (key, Some(value.to_string())),
        None => (token, None),
      };
      options.insert(key, value);
    }

    debug!(count = options.len(), "parsed options");
    options
  }

  /// Parse the raw option string from `FAKTORY_OPTIONS`.
  ///
  /// An unset variable yields an empty store.
  pub fn from_env() -> Self {
    match std::env::var(OPTIONS_ENV) {
      Ok(raw) => Self::parse(&raw),
      Err(_) => Self::default(),
    }
  }

  fn insert(&mut self, key: &str, value: Option<String>) {
    match self.entries.iter_mut().find(|(k, _)| k == key) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((key.to_string(), value)),
    }
  }

  /// True if the key was given, with or without a value.
  pub fn has(&self, name: &str) -> bool {
    self.entries.iter().any(|(k, _)| k == name)
  }

  /// The value of `name`, or `None` if it is missing or was given bare.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(k, _)| k == name)
      .and_then(|(_, v)| v.as_deref())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
  }
}

impl fmt::Display for Options {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[")?;
    for (key, value) in self.iter() {
      write!(f, "{{'{}'->'{}'}}", key, value.unwrap_or_default())?;
    }
    write!(f, "]")
  }
}
