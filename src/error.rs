//! Error types shared across subsystems.
//!
//! # Design Decisions
//! - Construction errors abort startup; they are never produced while matching
//! - Not-found / forbidden / denied are outcomes, not errors
//! - Handler failures travel through dispatch untouched

use thiserror::Error;

/// Errors raised while compiling route declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The declaration itself is malformed.
    #[error("invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    /// A second parameter name was declared at an occupied tree position.
    #[error("route parameter '{existing}' cannot be replaced by '{replacement}' in route '{route}'")]
    RouteConflict {
        route: String,
        existing: String,
        replacement: String,
    },

    /// An explicitly configured handler reference does not resolve.
    #[error("method '{target}' is not valid")]
    InvalidMethod { target: String },
}

impl RouteError {
    pub(crate) fn invalid(route: &str, reason: impl Into<String>) -> Self {
        RouteError::InvalidRoute {
            route: route.to_string(),
            reason: reason.into(),
        }
    }

    /// True for every declaration error, conflicts included.
    pub fn is_invalid_route(&self) -> bool {
        matches!(
            self,
            RouteError::InvalidRoute { .. } | RouteError::RouteConflict { .. }
        )
    }
}

/// A failure raised by an invoked handler, filter, renderer or error handler.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// A `func://` redirect names something that is not callable.
    #[error("method '{target}' is not valid")]
    InvalidMethod { target: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_counts_as_invalid_route() {
        let err = RouteError::RouteConflict {
            route: "/a/$y".into(),
            existing: "x".into(),
            replacement: "y".into(),
        };
        assert!(err.is_invalid_route());
        assert!(!RouteError::InvalidMethod { target: "f".into() }.is_invalid_route());
        assert_eq!(
            err.to_string(),
            "route parameter 'x' cannot be replaced by 'y' in route '/a/$y'"
        );
    }

    #[test]
    fn test_handler_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = HandlerError::with_source("render failed", io);
        assert_eq!(err.message(), "render failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
