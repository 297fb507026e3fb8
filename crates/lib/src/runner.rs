//! Recipe lifecycle: boot, build, validate, report.
//!
//! [`Runner::boot`] parses the option string and wires the status channels.
//! [`Runner::run`] drives one recipe through its build hook and then checks
//! the contract, reporting exactly one diagnostic when it was not honoured.
//! Checks happen in this order:
//!
//! 1. the build hook was overridden
//! 2. required options were present and valid
//! 3. a task chain was started
//! 4. every started chain was executed

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chain::panic_message;
use crate::options::Options;
use crate::recipe::{Context, Recipe, RecipeError};
use crate::status::{Status, StatusSink, StatusUpdater, TracingSink};

/// Terminal state of a recipe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
  /// The recipe kept the default build hook.
  BuildNotOverridden,
  /// A required option was missing or rejected.
  InvalidArguments { message: String },
  /// No task chain was started.
  NoTasks,
  /// A task chain was started but not executed.
  NotExecuted,
  /// A step failed; later steps in its chain were skipped.
  Failed {
    task: usize,
    name: Option<String>,
    message: String,
  },
  /// The build hook failed for another reason.
  Aborted { message: String },
  /// Every executed step succeeded.
  Completed { tasks: usize },
}

impl RunOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, RunOutcome::Completed { .. })
  }
}

/// Drives recipes against one parsed option set.
#[derive(Clone)]
pub struct Runner {
  options: Arc<Options>,
  sink: Arc<dyn StatusSink>,
  updater: StatusUpdater,
}

impl Runner {
  /// Parse `raw_options` and wire the live status callback.
  ///
  /// Messages go to a [`TracingSink`] until [`Runner::with_sink`] replaces it.
  /// Every call produces an independent runner.
  pub fn boot<U>(raw_options: &str, status_updater: U) -> Self
  where
    U: Fn(&str) + Send + Sync + 'static,
  {
    let options = Options::parse(raw_options);
    debug!(options = %options, "booted");

    Self {
      options: Arc::new(options),
      sink: Arc::new(TracingSink),
      updater: Arc::new(status_updater),
    }
  }

  /// Boot from the `FAKTORY_OPTIONS` environment variable.
  pub fn boot_from_env<U>(status_updater: U) -> Self
  where
    U: Fn(&str) + Send + Sync + 'static,
  {
    Self {
      options: Arc::new(Options::from_env()),
      sink: Arc::new(TracingSink),
      updater: Arc::new(status_updater),
    }
  }

  /// Replace the message sink.
  pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
    self.sink = sink;
    self
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  /// Run one recipe and report how it went.
  pub fn run<R>(&self, recipe: &mut R) -> RunOutcome
  where
    R: Recipe + ?Sized,
  {
    let status = Status::new(Arc::clone(&self.sink), Arc::clone(&self.updater));
    let name = recipe.name();

    info!(recipe = %name, "running recipe");
    status.update(&format!("Running {}", name));

    let mut ctx = Context::new(Arc::clone(&self.options), status.clone());
    let built = panic::catch_unwind(AssertUnwindSafe(|| recipe.build(&mut ctx)));

    let result = match built {
      Ok(result) => result.and_then(|()| check_contract(&ctx)),
      Err(payload) => Err(RecipeError::Other(anyhow::anyhow!(panic_message(payload.as_ref())))),
    };

    let outcome = match result {
      Ok(outcome) => outcome,
      Err(err) => {
        let message = format!("{:#}", err);
        warn!(recipe = %name, error = %message, "recipe did not run");
        status.log(&message);
        outcome_for(err, message)
      }
    };

    info!(recipe = %name, outcome = ?outcome, "recipe finished");
    outcome
  }
}

impl std::fmt::Debug for Runner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Runner")
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

/// Inspect the run state after a successful build hook.
fn check_contract(ctx: &Context) -> Result<RunOutcome, RecipeError> {
  if ctx.chains_created == 0 {
    return Err(RecipeError::NoTasks);
  }
  if ctx.chains_executed < ctx.chains_created {
    return Err(RecipeError::NotExecuted);
  }

  if let Some(failure) = ctx.summaries.iter().find_map(|s| s.failure.as_ref()) {
    return Ok(RunOutcome::Failed {
      task: failure.index,
      name: failure.name.clone(),
      message: failure.message.clone(),
    });
  }

  Ok(RunOutcome::Completed {
    tasks: ctx.summaries.iter().map(|s| s.completed).sum(),
  })
}

fn outcome_for(err: RecipeError, message: String) -> RunOutcome {
  match err {
    RecipeError::BuildNotOverridden => RunOutcome::BuildNotOverridden,
    RecipeError::MissingArgument(_) | RecipeError::InvalidArgument(_) => RunOutcome::InvalidArguments { message },
    RecipeError::NoTasks => RunOutcome::NoTasks,
    RecipeError::NotExecuted => RunOutcome::NotExecuted,
    RecipeError::Other(_) => RunOutcome::Aborted { message },
  }
}
