// storefront/src/pipeline/definition.rs

//! `Pipeline<TData, Err>` and its step bookkeeping.

use crate::core::step::{Handler, SkipCondition, StepDef};
use crate::error::PipelineError;
use std::collections::HashMap;
use tracing::error;

/// An ordered list of named steps with `before` / `on` / `after` handlers.
///
/// `TData` is the state shared by every handler of a run (wrapped in a
/// `ContextData`), `Err` the error type handlers return. `Err` must be
/// `From<PipelineError>` so engine failures surface through `run`.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,

  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,

  /// Setup mistakes (hooks on unknown steps, duplicate names). A pipeline
  /// carrying any of these refuses to run.
  pub(crate) setup_errors: Vec<PipelineError>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` step definitions.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let mut pipeline = Self {
      steps: Vec::with_capacity(step_defs.len()),
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
      setup_errors: Vec::new(),
    };
    for (name, optional, skip_if) in step_defs {
      pipeline.push_step(name, *optional, skip_if.clone());
    }
    pipeline
  }

  /// Appends a step at the end of the pipeline.
  pub fn push_step(&mut self, name: &str, optional: bool, skip_if: Option<SkipCondition<TData>>) {
    if self.has_step(name) {
      error!(step_name = name, "Pipeline setup error: duplicate step.");
      self.setup_errors.push(PipelineError::DuplicateStep {
        step_name: name.to_string(),
      });
      return;
    }
    self.steps.push(StepDef {
      name: name.to_string(),
      optional,
      skip_if,
    });
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Records a setup error when `step_name` is not declared. Returns whether it is.
  pub(crate) fn check_step_exists(&mut self, step_name: &str) -> bool {
    if self.has_step(step_name) {
      return true;
    }
    error!(step_name, "Pipeline setup error: handler registered for an undeclared step.");
    self.setup_errors.push(PipelineError::StepNotFound {
      step_name: step_name.to_string(),
    });
    false
  }
}
