// tests/pipeline_execution_tests.rs
mod common;

use common::setup_tracing;
use serial_test::serial;
use std::sync::Arc;
use storefront::{ContextData, Handler, Pipeline, PipelineControl, PipelineError, PipelineResult, SkipCondition};

#[derive(Clone, Debug, Default)]
struct TallyContext {
  total: i64,
  trail: Vec<String>,
  stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
enum TallyError {
  #[error("Pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Handler failed: {0}")]
  Handler(String),
}

fn add(label: &'static str, amount: i64) -> Handler<TallyContext, TallyError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total += amount;
      guard.trail.push(label.to_string());
      if guard.stop_at.as_deref() == Some(label) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

fn fail(label: &'static str) -> Handler<TallyContext, TallyError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      ctx.write().trail.push(label.to_string());
      Err(TallyError::Handler(format!("{label} refused")))
    })
  })
}

#[tokio::test]
#[serial]
async fn test_steps_run_in_declaration_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[
    ("price", false, None),
    ("discount", false, None),
    ("ship", false, None),
  ]);
  pipeline.on_root("price", add("price", 180));
  pipeline.on_root("discount", add("discount", -18));
  pipeline.on_root("ship", add("ship", 20));

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Completed));
  let guard = ctx.read();
  assert_eq!(guard.total, 182);
  assert_eq!(guard.trail, vec!["price", "discount", "ship"]);
}

#[tokio::test]
#[serial]
async fn test_before_and_after_wrap_the_main_handler() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[("charge", false, None)]);
  pipeline.after_root("charge", add("after", 0));
  pipeline.on_root("charge", add("on", 1));
  pipeline.before_root("charge", add("before", 0));

  let ctx = ContextData::new(TallyContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn test_stop_ends_the_run_without_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[
    ("first", false, None),
    ("halt", false, None),
    ("never", false, None),
  ]);
  pipeline.on_root("first", add("first", 1));
  pipeline.on_root("halt", add("halt", 1));
  pipeline.on_root("never", add("never", 100));

  let ctx = ContextData::new(TallyContext {
    stop_at: Some("halt".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().total, 2);
}

#[tokio::test]
#[serial]
async fn test_first_error_aborts_later_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[
    ("ok", false, None),
    ("bad", false, None),
    ("never", false, None),
  ]);
  pipeline.on_root("ok", add("ok", 1));
  pipeline.on_root("bad", fail("bad"));
  pipeline.after_root("bad", add("bad_after", 1));
  pipeline.on_root("never", add("never", 1));

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TallyError::Handler("bad refused".to_string())));
  assert_eq!(ctx.read().trail, vec!["ok", "bad"]);
}

#[tokio::test]
#[serial]
async fn test_failing_before_hook_prevents_main_handler() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[("submit", false, None)]);
  pipeline.before_root("submit", fail("guard"));
  pipeline.on_root("submit", add("submit", 1));

  let ctx = ContextData::new(TallyContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().trail, vec!["guard"]);
  assert_eq!(ctx.read().total, 0);
}

#[tokio::test]
#[serial]
async fn test_skip_if_is_evaluated_against_current_state() {
  setup_tracing();
  let skip_when_small: SkipCondition<TallyContext> = Arc::new(|ctx: ContextData<TallyContext>| ctx.read().total < 100);
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[
    ("price", false, None),
    ("discount", true, Some(skip_when_small)),
  ]);
  pipeline.on_root("price", add("price", 50));
  pipeline.on_root("discount", add("discount", -10));

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().trail, vec!["price"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[("maybe", true, None), ("always", false, None)]);
  pipeline.on_root("always", add("always", 1));

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().trail, vec!["always"]);
}

#[tokio::test]
#[serial]
async fn test_required_step_without_handlers_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TallyContext, TallyError>::new(&[("required", false, None)]);

  let result = pipeline.run(ContextData::new(TallyContext::default())).await;
  assert_eq!(
    result,
    Err(TallyError::Pipeline(PipelineError::HandlerMissing {
      step_name: "required".to_string()
    }))
  );
}

#[tokio::test]
#[serial]
async fn test_hook_on_undeclared_step_refuses_to_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[("known", false, None)]);
  pipeline.on_root("known", add("known", 1));
  pipeline.on_root("typo", add("typo", 1));

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;
  assert_eq!(
    result,
    Err(TallyError::Pipeline(PipelineError::StepNotFound {
      step_name: "typo".to_string()
    }))
  );
  assert!(ctx.read().trail.is_empty());
}

#[tokio::test]
#[serial]
async fn test_duplicate_step_names_refuse_to_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TallyError>::new(&[("once", false, None)]);
  pipeline.push_step("once", false, None);
  pipeline.on_root("once", add("once", 1));

  assert_eq!(pipeline.step_names(), vec!["once"]);
  let result = pipeline.run(ContextData::new(TallyContext::default())).await;
  assert_eq!(
    result,
    Err(TallyError::Pipeline(PipelineError::DuplicateStep {
      step_name: "once".to_string()
    }))
  );
}
