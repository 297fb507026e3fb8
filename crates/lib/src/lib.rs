//! faktory-lib: build recipes with fail-fast task chains
//!
//! This crate provides the pieces a build script is made of:
//! - `Options`: key/value parameters parsed from a raw option string
//! - `Recipe`: a user-defined build hook that declares tasks
//! - `TaskChain`: ordered steps that stop at the first failure
//! - `Runner`: boots the options, runs a recipe, and reports contract violations
//! - `fs`: delete helpers that report locked files instead of failing

pub mod chain;
pub mod consts;
pub mod fs;
pub mod logging;
pub mod options;
pub mod recipe;
pub mod runner;
pub mod status;

pub use chain::{ExecutionSummary, Task, TaskChain, TaskFailure};
pub use options::Options;
pub use recipe::{Context, FnRecipe, Recipe, RecipeError, from_fn};
pub use runner::{RunOutcome, Runner};
pub use status::{MemorySink, Status, StatusSink, StatusUpdater, TracingSink};
