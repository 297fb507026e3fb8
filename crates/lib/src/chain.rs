//! Fail-fast task chains.
//!
//! A chain owns an ordered list of deferred steps. [`TaskChain::execute`]
//! consumes it and runs the steps in declaration order on the calling thread.
//! The first step that returns an error or panics stops the chain; its
//! description goes to the status sink and nothing is propagated to the
//! caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::options::Options;
use crate::recipe::Context;
use crate::status::Status;

type StepFn<'c> = Box<dyn FnOnce(&Task<'_>) -> anyhow::Result<()> + 'c>;

struct Step<'c> {
  name: Option<String>,
  action: StepFn<'c>,
}

/// Handle passed to a running step.
pub struct Task<'t> {
  name: Option<&'t str>,
  index: usize,
  options: &'t Options,
  status: &'t Status,
}

impl<'t> Task<'t> {
  /// Forward a message to the status sink.
  pub fn log(&self, message: &str) {
    self.status.log(message);
  }

  pub fn update_status(&self, status: &str) {
    self.status.update(status);
  }

  pub fn options(&self) -> &Options {
    self.options
  }

  pub fn name(&self) -> Option<&str> {
    self.name
  }

  /// Zero-based position of this step in its chain.
  pub fn index(&self) -> usize {
    self.index
  }
}

/// The step that stopped a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
  pub index: usize,
  pub name: Option<String>,
  pub message: String,
}

/// What happened when a chain was executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
  pub total: usize,
  pub completed: usize,
  pub failure: Option<TaskFailure>,
}

impl ExecutionSummary {
  pub fn is_success(&self) -> bool {
    self.failure.is_none()
  }
}

/// An ordered chain of steps waiting to be executed.
#[must_use = "a task chain does nothing until `execute` is called"]
pub struct TaskChain<'c> {
  ctx: &'c mut Context,
  steps: Vec<Step<'c>>,
}

impl<'c> TaskChain<'c> {
  pub(crate) fn new(ctx: &'c mut Context) -> Self {
    Self { ctx, steps: Vec::new() }
  }

  /// Append a step.
  pub fn then<S>(mut self, step: S) -> Self
  where
    S: FnOnce(&Task<'_>) -> anyhow::Result<()> + 'c,
  {
    self.steps.push(Step {
      name: None,
      action: Box::new(step),
    });
    self
  }

  /// Append a named step. The name shows up in status updates.
  pub fn then_named<S>(mut self, name: &str, step: S) -> Self
  where
    S: FnOnce(&Task<'_>) -> anyhow::Result<()> + 'c,
  {
    self.steps.push(Step {
      name: Some(name.to_string()),
      action: Box::new(step),
    });
    self
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Run every step in order, stopping at the first failure.
  ///
  /// The run options are echoed to the sink before the first step.
  pub fn execute(self) -> ExecutionSummary {
    let TaskChain { ctx, steps } = self;
    ctx.chains_executed += 1;

    let total = steps.len();
    let mut summary = ExecutionSummary {
      total,
      completed: 0,
      failure: None,
    };

    if total > 0 {
      ctx.status.log(&format!("Options: {}", ctx.options));
    }

    for (index, step) in steps.into_iter().enumerate() {
      let Step { name, action } = step;

      let progress = match &name {
        Some(name) => format!("Task {}/{}: {}", index + 1, total, name),
        None => format!("Task {}/{}", index + 1, total),
      };
      ctx.status.update(&progress);

      let _span = info_span!("task", index, name = name.as_deref().unwrap_or_default()).entered();
      let task = Task {
        name: name.as_deref(),
        index,
        options: &ctx.options,
        status: &ctx.status,
      };

      let message = match panic::catch_unwind(AssertUnwindSafe(|| action(&task))) {
        Ok(Ok(())) => {
          debug!("task completed");
          summary.completed += 1;
          continue;
        }
        Ok(Err(err)) => format!("{:#}", err),
        Err(payload) => panic_message(payload.as_ref()),
      };

      warn!(error = %message, skipped = total - index - 1, "task failed, stopping chain");
      ctx.status.log(&message);
      summary.failure = Some(TaskFailure { index, name, message });
      break;
    }

    ctx.summaries.push(summary.clone());
    summary
  }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "panicked".to_string()
  }
}
