/* src/server/props/rust/src/context.rs */

use std::collections::HashMap;

/// Locale information shared by both rendering modes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocaleInfo {
  pub locale: Option<String>,
  pub locales: Vec<String>,
  pub default_locale: Option<String>,
}

/// Context handed to loaders while a page is generated ahead of request time.
#[derive(Clone, Debug, Default)]
pub struct StaticPropsContext {
  /// Route parameters, e.g. `slug` for "/blog/{slug}"
  pub params: HashMap<String, String>,
  pub preview: bool,
  pub preview_data: Option<serde_json::Value>,
  pub locale: LocaleInfo,
}

/// Context handed to loaders for a page rendered per request.
#[derive(Clone, Debug, Default)]
pub struct ServerSidePropsContext {
  pub params: HashMap<String, String>,
  /// Query string values; repeated keys keep every value in order.
  pub query: HashMap<String, Vec<String>>,
  /// Request path before rewrites, including the query string.
  pub resolved_url: String,
  /// Lowercased request header names.
  pub headers: HashMap<String, String>,
  pub preview: bool,
  pub preview_data: Option<serde_json::Value>,
  pub locale: LocaleInfo,
}

impl ServerSidePropsContext {
  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
  }

  /// First value of a query parameter.
  pub fn query_value(&self, name: &str) -> Option<&str> {
    self.query.get(name).and_then(|v| v.first()).map(String::as_str)
  }
}

/// Either rendering mode, for loaders shared between static and per-request pages.
#[derive(Clone, Debug)]
pub enum PageContext {
  Static(StaticPropsContext),
  ServerSide(ServerSidePropsContext),
}

impl PageContext {
  pub fn params(&self) -> &HashMap<String, String> {
    match self {
      Self::Static(ctx) => &ctx.params,
      Self::ServerSide(ctx) => &ctx.params,
    }
  }

  pub fn param(&self, name: &str) -> Option<&str> {
    self.params().get(name).map(String::as_str)
  }

  pub fn locale(&self) -> &LocaleInfo {
    match self {
      Self::Static(ctx) => &ctx.locale,
      Self::ServerSide(ctx) => &ctx.locale,
    }
  }

  pub fn is_preview(&self) -> bool {
    match self {
      Self::Static(ctx) => ctx.preview,
      Self::ServerSide(ctx) => ctx.preview,
    }
  }
}

impl From<StaticPropsContext> for PageContext {
  fn from(ctx: StaticPropsContext) -> Self {
    Self::Static(ctx)
  }
}

impl From<ServerSidePropsContext> for PageContext {
  fn from(ctx: ServerSidePropsContext) -> Self {
    Self::ServerSide(ctx)
  }
}
