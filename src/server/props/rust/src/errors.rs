/* src/server/props/rust/src/errors.rs */

use std::fmt;

use thiserror::Error;

/// Failure reported by a data loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderError {
  code: String,
  message: String,
  status: u16,
}

fn default_status(code: &str) -> u16 {
  match code {
    "VALIDATION_ERROR" => 400,
    "NOT_FOUND" => 404,
    "INVALID_RESULT" => 500,
    "INTERNAL_ERROR" => 500,
    _ => 500,
  }
}

impl LoaderError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
    Self { code: code.into(), message: message.into(), status }
  }

  pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
    let code = code.into();
    let status = default_status(&code);
    Self { code, message: message.into(), status }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::with_code("VALIDATION_ERROR", msg)
  }

  /// A lookup failed hard. Loaders that want the page to 404 should
  /// return `LoaderResult::not_found()` instead.
  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_code("NOT_FOUND", msg)
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::with_code("INTERNAL_ERROR", msg)
  }

  /// The loader produced a value that is not a loader result shape.
  pub fn invalid_result(msg: impl Into<String>) -> Self {
    Self::with_code("INVALID_RESULT", msg)
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }
}

impl fmt::Display for LoaderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for LoaderError {}

/// Failure of a whole composition. Carries the position of the loader that
/// caused it; no partial result survives.
#[derive(Debug, Error)]
pub enum ComposeError {
  #[error("loader #{index} failed: {source}")]
  Loader {
    index: usize,
    #[source]
    source: LoaderError,
  },

  #[error("loader #{index} panicked: {message}")]
  Panicked { index: usize, message: String },

  #[error("loader #{index} was cancelled")]
  Cancelled { index: usize },
}

impl ComposeError {
  /// Position of the failing loader in the composer's list.
  pub fn index(&self) -> usize {
    match self {
      Self::Loader { index, .. } | Self::Panicked { index, .. } | Self::Cancelled { index } => {
        *index
      }
    }
  }

  /// HTTP status the host should render for this failure.
  pub fn status(&self) -> u16 {
    match self {
      Self::Loader { source, .. } => source.status(),
      Self::Panicked { .. } | Self::Cancelled { .. } => 500,
    }
  }

  pub(crate) fn from_join(index: usize, err: tokio::task::JoinError) -> Self {
    if err.is_cancelled() {
      return Self::Cancelled { index };
    }
    let payload = err.into_panic();
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "non-string panic payload".to_string()
    };
    Self::Panicked { index, message }
  }
}
