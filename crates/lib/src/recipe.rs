//! Recipes and the build context handed to them.
//!
//! A recipe declares its work in [`Recipe::build`]: it validates the options
//! it needs with [`Context::requires`], then chains tasks with
//! [`Context::run`] and [`TaskChain::then`], and finally calls
//! [`TaskChain::execute`].
//!
//! ```ignore
//! struct Release;
//!
//! impl Recipe for Release {
//!   fn build(&mut self, ctx: &mut Context) -> Result<(), RecipeError> {
//!     let version = ctx.requires("version")?;
//!     ctx
//!       .run(|task| Ok(task.log("cleaning")))
//!       .then(move |task| Ok(task.log(&format!("packaging {}", version))))
//!       .execute();
//!     Ok(())
//!   }
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::chain::{ExecutionSummary, TaskChain, Task};
use crate::options::Options;
use crate::status::Status;

/// Contract and validation failures of a build hook.
///
/// The display strings are printed verbatim to the status sink.
#[derive(Debug, Error)]
pub enum RecipeError {
  /// The recipe kept the default build hook.
  #[error("Please override the Build() method.")]
  BuildNotOverridden,

  /// A required option was not given.
  #[error("Missing required argument '{0}'")]
  MissingArgument(String),

  /// A required option was given but its value was rejected.
  #[error("Argument '{0}' has invalid value.")]
  InvalidArgument(String),

  /// The build hook returned without starting a task chain.
  #[error("No Tasks found.")]
  NoTasks,

  /// A task chain was started but never executed.
  #[error("Please call Execute() method.")]
  NotExecuted,

  /// Any other failure raised by the build hook.
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

/// A user-defined build script.
pub trait Recipe {
  /// Name used in status updates and logs.
  fn name(&self) -> String {
    let full = std::any::type_name::<Self>();
    full.rsplit("::").next().unwrap_or(full).to_string()
  }

  /// Declare and execute the recipe's tasks.
  ///
  /// The default body reports that the hook was never overridden.
  fn build(&mut self, _ctx: &mut Context) -> Result<(), RecipeError> {
    Err(RecipeError::BuildNotOverridden)
  }
}

/// Recipe backed by a closure, see [`from_fn`].
pub struct FnRecipe<F> {
  name: String,
  build: F,
}

/// Build a recipe from a name and a build hook closure.
pub fn from_fn<F>(name: impl Into<String>, build: F) -> FnRecipe<F>
where
  F: FnMut(&mut Context) -> Result<(), RecipeError>,
{
  FnRecipe {
    name: name.into(),
    build,
  }
}

impl<F> Recipe for FnRecipe<F>
where
  F: FnMut(&mut Context) -> Result<(), RecipeError>,
{
  fn name(&self) -> String {
    self.name.clone()
  }

  fn build(&mut self, ctx: &mut Context) -> Result<(), RecipeError> {
    (self.build)(ctx)
  }
}

/// Per-run state for one build hook invocation.
#[derive(Debug)]
pub struct Context {
  pub(crate) options: Arc<Options>,
  pub(crate) status: Status,
  pub(crate) chains_created: usize,
  pub(crate) chains_executed: usize,
  pub(crate) summaries: Vec<ExecutionSummary>,
}

impl Context {
  pub(crate) fn new(options: Arc<Options>, status: Status) -> Self {
    Self {
      options,
      status,
      chains_created: 0,
      chains_executed: 0,
      summaries: Vec::new(),
    }
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn log(&self, message: &str) {
    self.status.log(message);
  }

  pub fn update_status(&self, status: &str) {
    self.status.update(status);
  }

  /// Require an option with a non-empty value.
  ///
  /// A bare key (given without `=value`) is rejected as invalid.
  pub fn requires(&self, name: &str) -> Result<String, RecipeError> {
    self.requires_with(name, |value| !value.is_empty())
  }

  /// Require an option whose value satisfies `is_valid`.
  ///
  /// A bare key is checked as the empty string.
  pub fn requires_with<P>(&self, name: &str, is_valid: P) -> Result<String, RecipeError>
  where
    P: Fn(&str) -> bool,
  {
    if !self.options.has(name) {
      return Err(RecipeError::MissingArgument(name.to_string()));
    }

    let value = self.options.get(name).unwrap_or_default();
    if !is_valid(value) {
      debug!(name, value, "required option rejected");
      return Err(RecipeError::InvalidArgument(name.to_string()));
    }

    Ok(value.to_string())
  }

  /// Start a task chain with its first step.
  pub fn run<'c, S>(&'c mut self, step: S) -> TaskChain<'c>
  where
    S: FnOnce(&Task<'_>) -> anyhow::Result<()> + 'c,
  {
    self.chains_created += 1;
    TaskChain::new(self).then(step)
  }

  /// Start a task chain with a named first step.
  pub fn run_named<'c, S>(&'c mut self, name: &str, step: S) -> TaskChain<'c>
  where
    S: FnOnce(&Task<'_>) -> anyhow::Result<()> + 'c,
  {
    self.chains_created += 1;
    TaskChain::new(self).then_named(name, step)
  }

  /// Summaries of every chain executed so far, in execution order.
  pub fn summaries(&self) -> &[ExecutionSummary] {
    &self.summaries
  }
}
