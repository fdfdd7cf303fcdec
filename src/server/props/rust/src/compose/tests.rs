/* src/server/props/rust/src/compose/tests.rs */

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::{Barrier, oneshot};
use tokio::time::{sleep, timeout};

use super::{ComposedFn, PropsComposer, compose};
use crate::context::{PageContext, ServerSidePropsContext};
use crate::errors::{ComposeError, LoaderError};
use crate::loader::{BoxFuture, DataLoader, LoaderOutput, json_loader, loader_fn, sync_loader};
use crate::result::{ComposedResult, LoaderResult, Props, Redirect, Revalidate};

fn returns(value: serde_json::Value) -> DataLoader<()> {
  json_loader(move |_ctx: Arc<()>| {
    let value = value.clone();
    async move { Ok(value) }
  })
}

fn delayed(ms: u64, value: serde_json::Value) -> DataLoader<()> {
  json_loader(move |_ctx: Arc<()>| {
    let value = value.clone();
    async move {
      sleep(Duration::from_millis(ms)).await;
      Ok(value)
    }
  })
}

fn fails(err: LoaderError) -> DataLoader<()> {
  sync_loader(move |_ctx: &()| Err(err.clone()))
}

/// Loader that reports through the returned receiver once it ran to completion.
/// The sender lives in the loader's future, so aborting the task drops it.
fn signals_completion(ms: u64) -> (DataLoader<()>, oneshot::Receiver<()>) {
  let (tx, rx) = oneshot::channel();
  let tx = Arc::new(Mutex::new(Some(tx)));
  let loader = loader_fn(move |_ctx: Arc<()>| {
    let tx = tx.lock().ok().and_then(|mut slot| slot.take());
    async move {
      sleep(Duration::from_millis(ms)).await;
      if let Some(tx) = tx {
        let _ = tx.send(());
      }
      Ok(LoaderResult::default().with_prop("slow", true))
    }
  });
  (loader, rx)
}

async fn run(composer: &PropsComposer<()>) -> Result<ComposedResult, ComposeError> {
  timeout(Duration::from_secs(5), composer.run(())).await.expect("composition timed out")
}

// -- Merge scenarios --

#[tokio::test]
async fn later_props_overwrite_earlier() {
  let composer =
    compose([returns(json!({"props": {"x": 1}})), returns(json!({"props": {"x": 2, "y": 3}}))]);
  let result = run(&composer).await.unwrap();
  assert_eq!(serde_json::to_value(result).unwrap(), json!({"props": {"x": 2, "y": 3}}));
}

#[tokio::test]
async fn not_found_short_circuits() {
  let composer = compose([returns(json!({"props": {"x": 1}})), returns(json!({"notFound": true}))]);
  assert_eq!(run(&composer).await.unwrap(), ComposedResult::NotFound);
}

#[tokio::test]
async fn redirect_beats_props() {
  let composer = compose([
    returns(json!({"redirect": {"destination": "/login", "permanent": false}})),
    returns(json!({"props": {"x": 1}})),
  ]);
  let result = run(&composer).await.unwrap();
  assert_eq!(
    serde_json::to_value(result).unwrap(),
    json!({"redirect": {"destination": "/login", "permanent": false}})
  );
}

#[tokio::test]
async fn truthy_revalidate_is_attached() {
  let composer = compose([returns(json!({"props": {"x": 1}, "revalidate": 60}))]);
  let result = run(&composer).await.unwrap();
  assert_eq!(serde_json::to_value(result).unwrap(), json!({"props": {"x": 1}, "revalidate": 60}));
}

#[tokio::test]
async fn empty_list_gives_empty_props() {
  let composer: PropsComposer<()> = compose([]);
  assert!(composer.is_empty());
  let result = run(&composer).await.unwrap();
  assert_eq!(serde_json::to_value(result).unwrap(), json!({"props": {}}));
}

#[tokio::test]
async fn falsy_revalidate_is_omitted() {
  let composer = compose([
    returns(json!({"props": {}, "revalidate": 60})),
    returns(json!({"props": {"x": 1}, "revalidate": false})),
  ]);
  let result = run(&composer).await.unwrap();
  assert_eq!(result.revalidate(), None);
  assert_eq!(serde_json::to_value(result).unwrap(), json!({"props": {"x": 1}}));
}

#[tokio::test]
async fn redirect_keeps_truthy_revalidate() {
  let composer = PropsComposer::new()
    .loader(returns(json!({"props": {"a": 1}, "revalidate": 10})))
    .loader(returns(json!({"redirect": {"destination": "/moved", "statusCode": 301}})));
  let result = run(&composer).await.unwrap();
  assert_eq!(result.redirect().map(Redirect::status_code), Some(301));
  assert_eq!(result.revalidate(), Some(Revalidate::Seconds(10)));
}

#[tokio::test]
async fn not_found_after_redirect_still_wins() {
  let composer = compose([
    returns(json!({"redirect": {"destination": "/login", "permanent": true}})),
    returns(json!({"notFound": true})),
  ]);
  assert!(run(&composer).await.unwrap().is_not_found());
}

// -- Ordering and concurrency --

#[tokio::test]
async fn results_consumed_in_list_order_not_completion_order() {
  let composer = compose([
    delayed(40, json!({"props": {"x": "slow"}})),
    returns(json!({"props": {"x": "fast"}})),
  ]);
  let result = run(&composer).await.unwrap();
  assert_eq!(result.props().unwrap()["x"], json!("fast"));
}

#[tokio::test]
async fn loaders_run_concurrently() {
  // Each loader waits for the other; awaiting them one by one would deadlock.
  let barrier = Arc::new(Barrier::new(2));
  let make = |key: &'static str| {
    let barrier = barrier.clone();
    loader_fn(move |_ctx: Arc<()>| {
      let barrier = barrier.clone();
      async move {
        barrier.wait().await;
        Ok(LoaderResult::default().with_prop(key, true))
      }
    })
  };
  let composer = compose([make("a"), make("b")]);
  let result = run(&composer).await.unwrap();
  assert_eq!(serde_json::to_value(result).unwrap(), json!({"props": {"a": true, "b": true}}));
}

#[tokio::test]
async fn every_loader_sees_the_same_context() {
  let read_id = |key: &'static str| {
    sync_loader(move |ctx: &PageContext| {
      Ok(LoaderResult::default().with_prop(key, ctx.param("id").unwrap_or_default()))
    })
  };
  let composer = compose([read_id("first"), read_id("second")]);

  let mut request = ServerSidePropsContext::default();
  request.params.insert("id".into(), "7".into());
  let result = composer.run(request.into()).await.unwrap();
  assert_eq!(
    serde_json::to_value(result).unwrap(),
    json!({"props": {"first": "7", "second": "7"}})
  );
}

#[tokio::test]
async fn short_circuit_leaves_pending_loaders_running() {
  let (slow, done) = signals_completion(30);
  let composer = compose([returns(json!({"notFound": true})), slow]);
  assert!(run(&composer).await.unwrap().is_not_found());
  assert!(timeout(Duration::from_secs(2), done).await.unwrap().is_ok());
}

#[tokio::test]
async fn short_circuit_cancels_pending_when_configured() {
  let (slow, done) = signals_completion(200);
  let composer = compose([returns(json!({"notFound": true})), slow]).cancel_pending(true);
  assert!(run(&composer).await.unwrap().is_not_found());
  // Aborted task drops its sender without sending.
  assert!(timeout(Duration::from_secs(2), done).await.unwrap().is_err());
}

#[tokio::test]
async fn repeated_runs_are_independent() {
  let composer =
    compose([returns(json!({"props": {"x": 1}})), returns(json!({"props": {"y": 2}}))]);
  let (a, b) = tokio::join!(run(&composer), run(&composer));
  let (a, b) = (a.unwrap(), b.unwrap());
  assert_eq!(a, b);
  assert_eq!(run(&composer).await.unwrap(), a);
}

#[tokio::test]
async fn into_fn_behaves_like_run() {
  let composed: ComposedFn<()> =
    compose([returns(json!({"props": {"x": 1}, "revalidate": true}))]).into_fn();
  let result = composed(()).await.unwrap();
  assert_eq!(
    serde_json::to_value(result).unwrap(),
    json!({"props": {"x": 1}, "revalidate": true})
  );
}

// -- Failures --

#[tokio::test]
async fn loader_error_keeps_index_and_cause() {
  let composer =
    compose([returns(json!({"props": {"x": 1}})), fails(LoaderError::validation("bad slug"))]);
  let err = run(&composer).await.unwrap_err();
  assert_eq!(err.index(), 1);
  assert_eq!(err.status(), 400);
  match err {
    ComposeError::Loader { source, .. } => assert_eq!(source.message(), "bad slug"),
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn malformed_result_is_a_loader_error() {
  let composer = compose([returns(json!({"props": [1, 2]}))]);
  match run(&composer).await.unwrap_err() {
    ComposeError::Loader { index: 0, source } => assert_eq!(source.code(), "INVALID_RESULT"),
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn not_found_before_failure_wins() {
  let composer =
    compose([returns(json!({"notFound": true})), fails(LoaderError::internal("db down"))]);
  assert!(run(&composer).await.unwrap().is_not_found());
}

#[tokio::test]
async fn failure_before_not_found_fails() {
  let composer =
    compose([fails(LoaderError::internal("db down")), returns(json!({"notFound": true}))]);
  let err = run(&composer).await.unwrap_err();
  assert_eq!(err.index(), 0);
  assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn panicking_loader_is_reported() {
  let boom: DataLoader<()> = sync_loader(|_ctx: &()| panic!("loader exploded"));
  let composer = compose([returns(json!({"props": {}})), boom]);
  match run(&composer).await.unwrap_err() {
    ComposeError::Panicked { index, message } => {
      assert_eq!(index, 1);
      assert_eq!(message, "loader exploded");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn loader_panicking_before_its_future_is_reported() {
  let eager: DataLoader<()> =
    Arc::new(|_ctx: Arc<()>| -> BoxFuture<LoaderOutput> { panic!("eager loader exploded") });
  let composer = compose([returns(json!({"props": {}})), eager]);
  match run(&composer).await.unwrap_err() {
    ComposeError::Panicked { index, message } => {
      assert_eq!(index, 1);
      assert_eq!(message, "eager loader exploded");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn not_found_false_is_ignored() {
  let composer = compose([returns(json!({"notFound": false, "props": {"x": 1}}))]);
  let result = run(&composer).await.unwrap();
  assert_eq!(serde_json::to_value(result).unwrap(), json!({"props": {"x": 1}}));
}

#[tokio::test]
async fn redirect_with_explicit_status_and_base_path() {
  let redirect = Redirect::with_status("https://example.com/docs", 301).unwrap().base_path(false);
  let composer = compose([
    sync_loader(|_ctx: &()| Ok(LoaderResult::props(Props::new()))),
    sync_loader(move |_ctx: &()| Ok(LoaderResult::redirect(redirect.clone()))),
  ]);
  let result = run(&composer).await.unwrap();
  assert_eq!(
    serde_json::to_value(result).unwrap(),
    json!({
      "redirect": {"destination": "https://example.com/docs", "statusCode": 301, "basePath": false}
    })
  );
}
