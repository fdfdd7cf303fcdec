/* src/server/props/rust/src/compose/mod.rs */

mod accumulator;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

pub use accumulator::{PropsAccumulator, merge_results};

use crate::errors::ComposeError;
use crate::loader::{BoxFuture, DataLoader, LoaderOutput};
use crate::result::ComposedResult;

/// The composed loader as a single callable, for hosts that store page hooks as functions.
pub type ComposedFn<C> =
  Arc<dyn Fn(C) -> BoxFuture<Result<ComposedResult, ComposeError>> + Send + Sync>;

/// Runs a fixed, ordered list of page loaders and folds their results into one.
pub struct PropsComposer<C> {
  loaders: Vec<DataLoader<C>>,
  cancel_pending: bool,
}

impl<C> Clone for PropsComposer<C> {
  fn clone(&self) -> Self {
    Self { loaders: self.loaders.clone(), cancel_pending: self.cancel_pending }
  }
}

/// Build a composer from loaders in the order their results are consumed.
pub fn compose<C>(loaders: impl IntoIterator<Item = DataLoader<C>>) -> PropsComposer<C> {
  PropsComposer { loaders: loaders.into_iter().collect(), cancel_pending: false }
}

/// Spawned loaders not yet consumed. Dropping it detaches them, or aborts
/// them when `abort_on_drop` is set.
struct InFlight {
  handles: VecDeque<JoinHandle<LoaderOutput>>,
  abort_on_drop: bool,
}

impl Drop for InFlight {
  fn drop(&mut self) {
    if self.abort_on_drop {
      for handle in &self.handles {
        handle.abort();
      }
    }
  }
}

impl<C> PropsComposer<C>
where
  C: Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self { loaders: Vec::new(), cancel_pending: false }
  }

  pub fn loader(mut self, loader: DataLoader<C>) -> Self {
    self.loaders.push(loader);
    self
  }

  /// Abort loaders that are still running once the outcome is decided early
  /// (not-found or failure). Off by default: they run to completion and
  /// their results are dropped.
  pub fn cancel_pending(mut self, cancel: bool) -> Self {
    self.cancel_pending = cancel;
    self
  }

  pub fn len(&self) -> usize {
    self.loaders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.loaders.is_empty()
  }

  /// Launch every loader against `context`, then consume their results in
  /// list order. Must be called from within a tokio runtime.
  #[tracing::instrument(level = "debug", skip_all, fields(loaders = self.loaders.len()))]
  pub async fn run(&self, context: C) -> Result<ComposedResult, ComposeError> {
    let context = Arc::new(context);
    // All loaders start before the first result is awaited. The loader is
    // called inside its task so a panic while building the future is caught too.
    let handles = self
      .loaders
      .iter()
      .map(|loader| {
        let loader = loader.clone();
        let ctx = context.clone();
        tokio::spawn(async move { loader(ctx).await })
      })
      .collect();
    let mut in_flight = InFlight { handles, abort_on_drop: self.cancel_pending };

    let mut acc = PropsAccumulator::default();
    let mut index = 0;
    while let Some(handle) = in_flight.handles.pop_front() {
      let result = match handle.await {
        Ok(Ok(result)) => result,
        Ok(Err(source)) => {
          warn!(index, error = %source, "page loader failed");
          return Err(ComposeError::Loader { index, source });
        }
        Err(join_err) => {
          let err = ComposeError::from_join(index, join_err);
          warn!(index, error = %err, "page loader task did not finish");
          return Err(err);
        }
      };
      if acc.absorb(result).is_break() {
        debug!(index, pending = in_flight.handles.len(), "loader reported not found");
        return Ok(ComposedResult::NotFound);
      }
      index += 1;
    }

    let composed = acc.finish();
    trace!(
      redirect = composed.redirect().is_some(),
      revalidate = composed.revalidate().is_some(),
      "composed page props"
    );
    Ok(composed)
  }

  /// Turn the composer into a plain callable sharing the same loaders.
  pub fn into_fn(self) -> ComposedFn<C> {
    let composer = Arc::new(self);
    Arc::new(move |context: C| -> BoxFuture<Result<ComposedResult, ComposeError>> {
      let composer = composer.clone();
      Box::pin(async move { composer.run(context).await })
    })
  }
}

impl<C> Default for PropsComposer<C>
where
  C: Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
