/* src/server/props/rust/src/compose/accumulator.rs */

use std::ops::ControlFlow;

use crate::result::{ComposedResult, LoaderResult, Props, Redirect, Revalidate};

/// Running state of one composition. Fresh per call, never shared.
#[derive(Debug, Default)]
pub struct PropsAccumulator {
  props: Props,
  redirect: Option<Redirect>,
  revalidate: Option<Revalidate>,
}

impl PropsAccumulator {
  /// Fold one loader result in. Field priority: not-found, revalidate,
  /// redirect, props. Breaks on not-found; the caller stops there.
  pub fn absorb(&mut self, result: LoaderResult) -> ControlFlow<()> {
    if result.not_found {
      return ControlFlow::Break(());
    }
    // Last writer wins, even a falsy one.
    if let Some(revalidate) = result.revalidate {
      self.revalidate = Some(revalidate);
    }
    if let Some(redirect) = result.redirect {
      self.redirect = Some(redirect);
    }
    if let Some(props) = result.props {
      self.props.extend(props);
    }
    ControlFlow::Continue(())
  }

  /// A recorded redirect beats props. Revalidate rides along with either when truthy.
  pub fn finish(self) -> ComposedResult {
    let revalidate = self.revalidate.filter(|r| r.is_truthy());
    match self.redirect {
      Some(redirect) => ComposedResult::Redirect { redirect, revalidate },
      None => ComposedResult::Props { props: self.props, revalidate },
    }
  }
}

/// Merge results that are already resolved, in order.
pub fn merge_results(results: impl IntoIterator<Item = LoaderResult>) -> ComposedResult {
  let mut acc = PropsAccumulator::default();
  for result in results {
    if acc.absorb(result).is_break() {
      return ComposedResult::NotFound;
    }
  }
  acc.finish()
}
