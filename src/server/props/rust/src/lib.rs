/* src/server/props/rust/src/lib.rs */

//! Compose several page data loaders into the single result a server
//! rendering pipeline expects: props, a redirect, or not-found.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use seam_props::{LoaderResult, StaticPropsContext, compose, loader_fn};
//!
//! # async fn demo() -> Result<(), seam_props::ComposeError> {
//! let page = compose([
//!   loader_fn(|_ctx: Arc<StaticPropsContext>| async {
//!     Ok(LoaderResult::default().with_prop("title", "Hello"))
//!   }),
//!   loader_fn(|_ctx: Arc<StaticPropsContext>| async {
//!     Ok(LoaderResult::default().with_prop("views", 3).with_revalidate(60_u64))
//!   }),
//! ]);
//! let result = page.run(StaticPropsContext::default()).await?;
//! assert_eq!(result.props().map(|p| p.len()), Some(2));
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod context;
pub mod errors;
pub mod loader;
pub mod result;

// Re-exports for ergonomic use
pub use compose::{ComposedFn, PropsAccumulator, PropsComposer, compose, merge_results};
pub use context::{LocaleInfo, PageContext, ServerSidePropsContext, StaticPropsContext};
pub use errors::{ComposeError, LoaderError};
pub use loader::{BoxFuture, DataLoader, LoaderOutput, json_loader, loader_fn, sync_loader};
pub use result::{
  ComposedResult, LoaderResult, Props, REDIRECT_STATUS_CODES, Redirect, RedirectStatus, Revalidate,
};
