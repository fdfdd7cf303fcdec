/* src/server/props/rust/src/result.rs */

use serde::{Deserialize, Serialize};

use crate::errors::LoaderError;

/// Named values handed to the page component. Keeps insertion order.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// How often a statically generated page is regenerated. Seconds are whole
/// and non-negative, as the host framework requires; fractional or negative
/// numbers fail to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Revalidate {
  Flag(bool),
  Seconds(u64),
}

impl Revalidate {
  /// `0` seconds and `false` both mean "never revalidate".
  pub fn is_truthy(self) -> bool {
    match self {
      Self::Flag(flag) => flag,
      Self::Seconds(secs) => secs > 0,
    }
  }
}

impl From<u64> for Revalidate {
  fn from(secs: u64) -> Self {
    Self::Seconds(secs)
  }
}

impl From<bool> for Revalidate {
  fn from(flag: bool) -> Self {
    Self::Flag(flag)
  }
}

/// Status codes a redirect may answer with.
pub const REDIRECT_STATUS_CODES: [u16; 5] = [301, 302, 303, 307, 308];

fn check_status_code(destination: &str, code: u16) -> Result<(), String> {
  if REDIRECT_STATUS_CODES.contains(&code) {
    Ok(())
  } else {
    Err(format!(
      "redirect to '{destination}' uses status {code}, expected one of {REDIRECT_STATUS_CODES:?}"
    ))
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectStatus {
  Permanent(bool),
  StatusCode(u16),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRedirect", into = "RawRedirect")]
pub struct Redirect {
  pub destination: String,
  pub status: RedirectStatus,
  /// `Some(false)` sends the destination without the app's base path.
  pub base_path: Option<bool>,
}

impl Redirect {
  pub fn temporary(destination: impl Into<String>) -> Self {
    Self {
      destination: destination.into(),
      status: RedirectStatus::Permanent(false),
      base_path: None,
    }
  }

  pub fn permanent(destination: impl Into<String>) -> Self {
    Self {
      destination: destination.into(),
      status: RedirectStatus::Permanent(true),
      base_path: None,
    }
  }

  /// Redirect with an explicit status; only codes in `REDIRECT_STATUS_CODES` are accepted.
  pub fn with_status(destination: impl Into<String>, code: u16) -> Result<Self, LoaderError> {
    let destination = destination.into();
    check_status_code(&destination, code).map_err(LoaderError::invalid_result)?;
    Ok(Self { destination, status: RedirectStatus::StatusCode(code), base_path: None })
  }

  pub fn base_path(mut self, enabled: bool) -> Self {
    self.base_path = Some(enabled);
    self
  }

  /// HTTP status to answer with: 308/307 for the permanent flag, else the explicit code.
  pub fn status_code(&self) -> u16 {
    match self.status {
      RedirectStatus::Permanent(true) => 308,
      RedirectStatus::Permanent(false) => 307,
      RedirectStatus::StatusCode(code) => code,
    }
  }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRedirect {
  destination: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  permanent: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  status_code: Option<u16>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  base_path: Option<bool>,
}

impl TryFrom<RawRedirect> for Redirect {
  type Error = String;

  fn try_from(raw: RawRedirect) -> Result<Self, Self::Error> {
    let status = match (raw.permanent, raw.status_code) {
      (Some(permanent), None) => RedirectStatus::Permanent(permanent),
      (None, Some(code)) => {
        check_status_code(&raw.destination, code)?;
        RedirectStatus::StatusCode(code)
      }
      (Some(_), Some(_)) => {
        return Err(format!(
          "redirect to '{}' sets both `permanent` and `statusCode`",
          raw.destination
        ));
      }
      (None, None) => {
        return Err(format!(
          "redirect to '{}' needs either `permanent` or `statusCode`",
          raw.destination
        ));
      }
    };
    Ok(Self { destination: raw.destination, status, base_path: raw.base_path })
  }
}

impl From<Redirect> for RawRedirect {
  fn from(redirect: Redirect) -> Self {
    let (permanent, status_code) = match redirect.status {
      RedirectStatus::Permanent(p) => (Some(p), None),
      RedirectStatus::StatusCode(c) => (None, Some(c)),
    };
    Self {
      destination: redirect.destination,
      permanent,
      status_code,
      base_path: redirect.base_path,
    }
  }
}

fn is_false(b: &bool) -> bool {
  !*b
}

/// What a single loader produced. Any combination of fields may be set;
/// the composer reads them in a fixed priority order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderResult {
  #[serde(default, skip_serializing_if = "is_false")]
  pub not_found: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub redirect: Option<Redirect>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub props: Option<Props>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub revalidate: Option<Revalidate>,
}

impl LoaderResult {
  pub fn not_found() -> Self {
    Self { not_found: true, ..Self::default() }
  }

  pub fn redirect(redirect: Redirect) -> Self {
    Self { redirect: Some(redirect), ..Self::default() }
  }

  pub fn props(props: Props) -> Self {
    Self { props: Some(props), ..Self::default() }
  }

  /// Build from a JSON object such as `{"props": {...}, "revalidate": 60}`.
  pub fn from_json(value: serde_json::Value) -> Result<Self, LoaderError> {
    if !value.is_object() {
      return Err(LoaderError::invalid_result(format!("expected an object, got {value}")));
    }
    serde_json::from_value(value).map_err(|e| LoaderError::invalid_result(e.to_string()))
  }

  pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
    self.props.get_or_insert_with(Props::new).insert(key.into(), value.into());
    self
  }

  pub fn with_revalidate(mut self, revalidate: impl Into<Revalidate>) -> Self {
    self.revalidate = Some(revalidate.into());
    self
  }
}

/// Final merged answer handed back to the rendering pipeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(into = "LoaderResult")]
pub enum ComposedResult {
  NotFound,
  Redirect { redirect: Redirect, revalidate: Option<Revalidate> },
  Props { props: Props, revalidate: Option<Revalidate> },
}

impl ComposedResult {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound)
  }

  pub fn props(&self) -> Option<&Props> {
    match self {
      Self::Props { props, .. } => Some(props),
      _ => None,
    }
  }

  pub fn redirect(&self) -> Option<&Redirect> {
    match self {
      Self::Redirect { redirect, .. } => Some(redirect),
      _ => None,
    }
  }

  pub fn revalidate(&self) -> Option<Revalidate> {
    match self {
      Self::NotFound => None,
      Self::Redirect { revalidate, .. } | Self::Props { revalidate, .. } => *revalidate,
    }
  }
}

impl From<ComposedResult> for LoaderResult {
  fn from(result: ComposedResult) -> Self {
    match result {
      ComposedResult::NotFound => Self::not_found(),
      ComposedResult::Redirect { redirect, revalidate } => {
        Self { redirect: Some(redirect), revalidate, ..Self::default() }
      }
      ComposedResult::Props { props, revalidate } => {
        Self { props: Some(props), revalidate, ..Self::default() }
      }
    }
  }
}
