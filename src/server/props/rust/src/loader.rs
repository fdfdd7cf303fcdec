/* src/server/props/rust/src/loader.rs */

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future;

use crate::errors::LoaderError;
use crate::result::LoaderResult;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type LoaderOutput = Result<LoaderResult, LoaderError>;

/// A page data loader. Every loader of a composer receives the same shared context.
pub type DataLoader<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<LoaderOutput> + Send + Sync>;

/// Wrap an async function as a loader.
pub fn loader_fn<C, F, Fut>(f: F) -> DataLoader<C>
where
  C: Send + Sync + 'static,
  F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = LoaderOutput> + Send + 'static,
{
  Arc::new(move |ctx: Arc<C>| -> BoxFuture<LoaderOutput> { Box::pin(f(ctx)) })
}

/// Wrap a synchronous function as a loader. The function runs when the
/// future is first polled, so it still runs on its own task.
pub fn sync_loader<C, F>(f: F) -> DataLoader<C>
where
  C: Send + Sync + 'static,
  F: Fn(&C) -> LoaderOutput + Send + Sync + 'static,
{
  let f = Arc::new(f);
  Arc::new(move |ctx: Arc<C>| -> BoxFuture<LoaderOutput> {
    let f = f.clone();
    Box::pin(future::lazy(move |_| f(&ctx)))
  })
}

/// Wrap an async function that answers with a raw JSON object in the
/// `{"props": .., "redirect": .., "notFound": .., "revalidate": ..}` shape.
pub fn json_loader<C, F, Fut>(f: F) -> DataLoader<C>
where
  C: Send + Sync + 'static,
  F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<serde_json::Value, LoaderError>> + Send + 'static,
{
  let f = Arc::new(f);
  Arc::new(move |ctx: Arc<C>| -> BoxFuture<LoaderOutput> {
    let f = f.clone();
    Box::pin(async move { LoaderResult::from_json(f(ctx).await?) })
  })
}
