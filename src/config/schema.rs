//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration: router settings, route declarations, localizations
/// and error handlers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Router settings.
    pub router: RouterConfig,

    /// Ordered route declarations.
    pub routes: Vec<RouteConfig>,

    /// `locale -> canonical segment -> localized segment`.
    pub localizations: BTreeMap<String, BTreeMap<String, String>>,

    /// Error handlers keyed by HTTP status code.
    pub handlers: BTreeMap<String, ErrorHandlerConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Router settings consumed at construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Path prefix stripped from incoming requests and prepended to
    /// localized routes.
    pub root: String,

    /// Active locale key into `localizations`.
    pub locale: String,

    /// Filter attached to declarations that do not name one.
    pub default_filter: Option<String>,

    /// Redirect attached to declarations that do not name one.
    pub default_redirect: Option<String>,

    /// Route used for `/` and for explicitly empty redirects.
    pub default_route: Option<String>,

    /// Controller tried first for single-segment convention lookups.
    pub default_controller: String,

    /// Method called when a segment names a controller.
    pub default_method: String,

    /// Enable convention-based controller/method resolution.
    pub allow_autoload: bool,

    /// Requests with a segment starting with this prefix are not found.
    pub forbidden_prefix: Option<String>,

    /// Directory (under the root) holding controller files.
    pub base_dir: String,

    /// Filesystem directory the root is relative to.
    pub document_root: String,

    /// File extension of controller files.
    pub controller_extension: String,

    /// `name|args` called for unmatched routes.
    pub static_renderer: Option<String>,

    /// Dispatch an initial request right after construction.
    pub autoprocess: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            locale: "en".to_string(),
            default_filter: None,
            default_redirect: None,
            default_route: None,
            default_controller: "Home".to_string(),
            default_method: "index".to_string(),
            allow_autoload: false,
            forbidden_prefix: None,
            base_dir: "controllers".to_string(),
            document_root: ".".to_string(),
            controller_extension: "rs".to_string(),
            static_renderer: None,
            autoprocess: false,
        }
    }
}

/// Blank strings in optional settings mean "not configured".
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RouterConfig {
    pub fn default_filter(&self) -> Option<&str> {
        non_blank(&self.default_filter)
    }

    pub fn default_redirect(&self) -> Option<&str> {
        non_blank(&self.default_redirect)
    }

    pub fn default_route(&self) -> Option<&str> {
        non_blank(&self.default_route)
    }

    pub fn forbidden_prefix(&self) -> Option<&str> {
        self.forbidden_prefix.as_deref().filter(|s| !s.is_empty())
    }

    pub fn static_renderer(&self) -> Option<&str> {
        non_blank(&self.static_renderer)
    }
}

/// Declared methods: a comma separated string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Methods {
    List(Vec<String>),
    Joined(String),
}

impl Methods {
    /// Comma separated form.
    pub fn joined(&self) -> String {
        match self {
            Methods::List(items) => items.join(","),
            Methods::Joined(s) => s.clone(),
        }
    }
}

/// One route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// `/`-separated pattern; `$name` segments capture.
    pub pattern: String,

    /// `Controller#method` or function name.
    pub target: String,

    /// Allowed methods; absent or blank means ANY.
    #[serde(default)]
    pub methods: Option<Methods>,

    /// `name|args` guard. An explicit blank disables the default filter.
    #[serde(default)]
    pub filter: Option<String>,

    /// Redirect used when the guard denies. An explicit blank means the
    /// default route.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl RouteConfig {
    pub fn new(pattern: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            target: target.into(),
            methods: None,
            filter: None,
            redirect: None,
        }
    }

    pub fn methods(mut self, methods: impl Into<String>) -> Self {
        self.methods = Some(Methods::Joined(methods.into()));
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

/// An error handler: a reference, or a reference followed by leading
/// arguments. The message is always passed last.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ErrorHandlerConfig {
    Single(String),
    WithArgs(Vec<String>),
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
