//! Handler, filter and redirect references carried by target records.
//!
//! References are plain strings in configuration:
//! - `name` — a free function
//! - `Controller#method` — a method on a registered controller
//! - `name|a,$id` — a call with arguments; `$id` is replaced by the captured
//!   parameter `id` at match time
//! - `func://name|a,b` — a redirect that invokes a function instead

use std::fmt;

use serde::{Serialize, Serializer};

use crate::routing::params::Params;

pub const METHOD_SEPARATOR: char = '#';
pub const ARGS_SEPARATOR: char = '|';
pub const ARG_LIST_SEPARATOR: char = ',';
pub const PARAM_MARKER: char = '$';
pub const FUNCTION_REDIRECT: &str = "func://";
pub const ROUTE_PLACEHOLDER: &str = "{route}";

/// What a target, filter or renderer points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerRef {
    Function(String),
    Method { controller: String, method: String },
}

impl HandlerRef {
    /// Parses a reference, ignoring any `|args` suffix.
    pub fn parse(reference: &str) -> Self {
        let name = reference
            .split_once(ARGS_SEPARATOR)
            .map_or(reference, |(name, _)| name);
        match name.split_once(METHOD_SEPARATOR) {
            Some((controller, method)) => HandlerRef::Method {
                controller: controller.to_string(),
                method: method.to_string(),
            },
            None => HandlerRef::Function(name.to_string()),
        }
    }

    pub fn method(controller: impl Into<String>, method: impl Into<String>) -> Self {
        HandlerRef::Method {
            controller: controller.into(),
            method: method.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            HandlerRef::Function(name) => name.is_empty(),
            HandlerRef::Method { controller, method } => controller.is_empty() && method.is_empty(),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Function(name) => f.write_str(name),
            HandlerRef::Method { controller, method } => {
                write!(f, "{}{}{}", controller, METHOD_SEPARATOR, method)
            }
        }
    }
}

impl Serialize for HandlerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One declared argument: a literal, or a `$name` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Literal(String),
    Param(String),
}

impl Arg {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PARAM_MARKER) {
            Some(name) => Arg::Param(name.to_string()),
            None => Arg::Literal(raw.to_string()),
        }
    }

    /// Substitutes captured parameters. A placeholder without a capture
    /// resolves to `None`.
    pub fn resolve(&self, params: &Params) -> Option<String> {
        match self {
            Arg::Literal(value) => Some(value.clone()),
            Arg::Param(name) => params.get(name).map(str::to_string),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Literal(value) => f.write_str(value),
            Arg::Param(name) => write!(f, "{}{}", PARAM_MARKER, name),
        }
    }
}

/// A reference plus optional declared arguments (`name|a,$b`).
///
/// `args` is `None` when no `|` was present, which is distinct from an
/// empty argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub target: HandlerRef,
    pub args: Option<Vec<Arg>>,
}

/// Filters are plain call specs whose result is read as allow/deny.
pub type FilterSpec = CallSpec;

impl CallSpec {
    pub fn parse(spec: &str) -> Self {
        let args = spec.split_once(ARGS_SEPARATOR).map(|(_, args)| {
            args.split(ARG_LIST_SEPARATOR).map(Arg::parse).collect()
        });
        Self {
            target: HandlerRef::parse(spec),
            args,
        }
    }

    /// Parses a possibly-blank call declaration; blank means "none".
    pub fn parse_optional(spec: Option<&str>) -> Option<Self> {
        spec.map(str::trim).filter(|s| !s.is_empty()).map(Self::parse)
    }
}

impl fmt::Display for CallSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(args) = &self.args {
            write!(f, "{}", ARGS_SEPARATOR)?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", ARG_LIST_SEPARATOR)?;
                }
                write!(f, "{}", arg)?;
            }
        }
        Ok(())
    }
}

impl Serialize for CallSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where a denied (or handler-less) match goes instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectSpec {
    /// URL template; `{route}` is replaced by the encoded request target.
    Location(String),
    /// `func://name|args` body, parsed after `{route}` substitution.
    Function(String),
}

impl RedirectSpec {
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix(FUNCTION_REDIRECT) {
            Some(call) => RedirectSpec::Function(call.to_string()),
            None => RedirectSpec::Location(spec.to_string()),
        }
    }
}

impl fmt::Display for RedirectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectSpec::Location(template) => f.write_str(template),
            RedirectSpec::Function(call) => write!(f, "{}{}", FUNCTION_REDIRECT, call),
        }
    }
}

impl Serialize for RedirectSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The handler, filter and redirect registered for one method at one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetRecord {
    pub handler: HandlerRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectSpec>,
}

impl TargetRecord {
    pub fn new(handler: HandlerRef) -> Self {
        Self {
            handler,
            filter: None,
            redirect: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_ref_parse() {
        assert_eq!(
            HandlerRef::parse("UserCtrl#show"),
            HandlerRef::method("UserCtrl", "show")
        );
        assert_eq!(
            HandlerRef::parse("render|tpl"),
            HandlerRef::Function("render".into())
        );
        assert_eq!(HandlerRef::parse("Admin/Users#index").to_string(), "Admin/Users#index");
    }

    #[test]
    fn test_call_spec_args() {
        let spec = CallSpec::parse("auth|admin,$id");
        assert_eq!(spec.target, HandlerRef::Function("auth".into()));
        assert_eq!(
            spec.args,
            Some(vec![Arg::Literal("admin".into()), Arg::Param("id".into())])
        );
        assert_eq!(spec.to_string(), "auth|admin,$id");

        assert_eq!(CallSpec::parse("auth").args, None);
        assert_eq!(CallSpec::parse_optional(Some("  ")), None);
        assert_eq!(CallSpec::parse_optional(None), None);
    }

    #[test]
    fn test_arg_resolution() {
        let mut params = Params::new();
        params.push("id", "42");
        assert_eq!(Arg::parse("$id").resolve(&params), Some("42".into()));
        assert_eq!(Arg::parse("$missing").resolve(&params), None);
        assert_eq!(Arg::parse("x").resolve(&params), Some("x".into()));
    }

    #[test]
    fn test_redirect_spec() {
        assert_eq!(
            RedirectSpec::parse("func://deny|$id"),
            RedirectSpec::Function("deny|$id".into())
        );
        assert_eq!(
            RedirectSpec::parse("/login?from={route}"),
            RedirectSpec::Location("/login?from={route}".into())
        );
        assert_eq!(RedirectSpec::parse("func://deny").to_string(), "func://deny");
    }
}
