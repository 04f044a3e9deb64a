// storefront/src/error.rs
use thiserror::Error;

/// Errors raised by the pipeline engine itself, as opposed to its handlers.
///
/// A pipeline's handler error type must be `From<PipelineError>` so these can
/// surface through `Pipeline::run`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Step already defined: {step_name}")]
  DuplicateStep { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
