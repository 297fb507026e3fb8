use anyhow::anyhow;
use faktory_lib::{Context, Recipe, RecipeError, RunOutcome};

use super::common::boot;

const DIAGNOSTICS: &[&str] = &[
  "Please override the Build() method.",
  "Please call Execute() method.",
  "No Tasks found.",
];

struct WithoutOverridingBuild;

impl Recipe for WithoutOverridingBuild {}

struct WithoutCallingExecute {
  executed: bool,
}

impl Recipe for WithoutCallingExecute {
  fn build(&mut self, ctx: &mut Context) -> Result<(), RecipeError> {
    let executed = &mut self.executed;
    let _chain = ctx.run(move |_| {
      *executed = true;
      Ok(())
    });
    Ok(())
  }
}

struct WithNoTasks;

impl Recipe for WithNoTasks {
  fn build(&mut self, _ctx: &mut Context) -> Result<(), RecipeError> {
    Ok(())
  }
}

struct WithRequiredParameter;

impl Recipe for WithRequiredParameter {
  fn build(&mut self, ctx: &mut Context) -> Result<(), RecipeError> {
    let value = ctx.requires("required")?;
    ctx
      .run(move |task| {
        task.log(&format!("required is {}", value));
        Ok(())
      })
      .execute();
    Ok(())
  }
}

struct WithSingleTask;

impl Recipe for WithSingleTask {
  fn build(&mut self, ctx: &mut Context) -> Result<(), RecipeError> {
    ctx
      .run(|task| {
        task.log("First task ran!");
        Ok(())
      })
      .execute();
    Ok(())
  }
}

struct WithMultipleTasksFirstFails;

impl Recipe for WithMultipleTasksFirstFails {
  fn build(&mut self, ctx: &mut Context) -> Result<(), RecipeError> {
    ctx
      .run(|_| Err(anyhow!("Exception of type 'Error' was thrown.")))
      .then(|task| {
        task.log("Second task ran!");
        Ok(())
      })
      .execute();
    Ok(())
  }
}

fn diagnostics_in(messages: &[String]) -> Vec<&str> {
  DIAGNOSTICS
    .iter()
    .copied()
    .filter(|d| messages.iter().any(|m| m == d))
    .collect()
}

#[test]
fn without_overriding_build_reports_it() {
  let (runner, sink) = boot("");

  let outcome = runner.run(&mut WithoutOverridingBuild);

  assert_eq!(outcome, RunOutcome::BuildNotOverridden);
  assert_eq!(sink.all_messages(), vec!["Please override the Build() method."]);
}

#[test]
fn without_calling_execute_reports_it() {
  let (runner, sink) = boot("");
  let mut recipe = WithoutCallingExecute { executed: false };

  let outcome = runner.run(&mut recipe);

  assert_eq!(outcome, RunOutcome::NotExecuted);
  assert!(!recipe.executed);
  assert_eq!(diagnostics_in(&sink.all_messages()), vec!["Please call Execute() method."]);
}

#[test]
fn without_any_tasks_reports_it() {
  let (runner, sink) = boot("");

  let outcome = runner.run(&mut WithNoTasks);

  assert_eq!(outcome, RunOutcome::NoTasks);
  assert_eq!(sink.all_messages(), vec!["No Tasks found."]);
}

#[test]
fn without_required_param_shows_error() {
  let (runner, sink) = boot("");

  let outcome = runner.run(&mut WithRequiredParameter);

  assert!(matches!(outcome, RunOutcome::InvalidArguments { .. }));
  assert!(sink.contains("Missing required argument 'required'"));
  assert!(diagnostics_in(&sink.all_messages()).is_empty());
}

#[test]
fn with_required_but_invalid_param_shows_error() {
  let (runner, sink) = boot("required");

  let outcome = runner.run(&mut WithRequiredParameter);

  assert_eq!(
    outcome,
    RunOutcome::InvalidArguments {
      message: "Argument 'required' has invalid value.".to_string()
    }
  );
  assert_eq!(sink.all_messages(), vec!["Argument 'required' has invalid value."]);
}

#[test]
fn with_required_param_runs() {
  let (runner, sink) = boot("required=yes");

  let outcome = runner.run(&mut WithRequiredParameter);

  assert_eq!(outcome, RunOutcome::Completed { tasks: 1 });
  assert_eq!(
    sink.all_messages(),
    vec!["Options: [{'required'->'yes'}]", "required is yes"]
  );
}

#[test]
fn multiple_params_are_printed_before_tasks() {
  let (runner, sink) = boot("A=1 B=2 C=3");

  runner.run(&mut WithSingleTask);

  assert_eq!(
    sink.all_messages(),
    vec!["Options: [{'A'->'1'}{'B'->'2'}{'C'->'3'}]", "First task ran!"]
  );
}

#[test]
fn with_multiple_tasks_first_fails_stops_chain() {
  let (runner, sink) = boot("");

  let outcome = runner.run(&mut WithMultipleTasksFirstFails);

  assert_eq!(
    outcome,
    RunOutcome::Failed {
      task: 0,
      name: None,
      message: "Exception of type 'Error' was thrown.".to_string(),
    }
  );
  assert!(sink.contains("Exception of type 'Error' was thrown."));
  assert!(!sink.contains("Second task ran!"));
}

#[test]
fn boot_resets_between_runs() {
  let (first, first_sink) = boot("A=1");
  let (second, second_sink) = boot("B=2");

  first.run(&mut WithSingleTask);
  second.run(&mut WithSingleTask);

  assert!(first_sink.contains("Options: [{'A'->'1'}]"));
  assert!(!first_sink.contains("Options: [{'B'->'2'}]"));
  assert!(second_sink.contains("Options: [{'B'->'2'}]"));
}

#[test]
fn runner_can_be_reused_for_several_recipes() {
  let (runner, sink) = boot("");

  assert_eq!(runner.run(&mut WithNoTasks), RunOutcome::NoTasks);
  assert_eq!(runner.run(&mut WithSingleTask), RunOutcome::Completed { tasks: 1 });
  assert_eq!(sink.all_messages(), vec!["No Tasks found.", "Options: []", "First task ran!"]);
}

#[test]
fn closure_recipe_runs() {
  let (runner, sink) = boot("configuration=Release");
  let mut recipe = faktory_lib::from_fn("release", |ctx| {
    let configuration = ctx.requires_with("configuration", |v| v == "Debug" || v == "Release")?;
    ctx
      .run_named("build", move |task| {
        task.log(&format!("building {}", configuration));
        Ok(())
      })
      .execute();
    Ok(())
  });

  assert!(runner.run(&mut recipe).is_success());
  assert!(sink.contains("building Release"));
}
