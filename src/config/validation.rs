//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route declarations before compilation (methods, parameter names)
//! - Check localizations can be reversed unambiguously
//! - Check error handler keys are status codes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::{DispatchConfig, Methods};
use crate::routing::method::Method;
use crate::routing::path::tokenize;
use crate::routing::target::PARAM_MARKER;
use crate::routing::tree::RESERVED_MARKER;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route '{pattern}' has no target")]
    EmptyTarget { pattern: String },

    #[error("method '{method}' is not allowed in route '{pattern}'")]
    UnknownMethod { pattern: String, method: String },

    #[error("route parameter '{name}' in route '{pattern}' is invalid")]
    InvalidParameter { pattern: String, name: String },

    #[error("locale '{locale}' maps both '{first}' and '{second}' to '{value}'")]
    AmbiguousLocalization {
        locale: String,
        value: String,
        first: String,
        second: String,
    },

    #[error("error handler key '{key}' is not an HTTP status code")]
    InvalidHandlerCode { key: String },

    #[error("error handler for {code} names no function")]
    EmptyHandler { code: String },

    #[error("'{field}' must be set when allow_autoload is enabled")]
    MissingAutoloadSetting { field: &'static str },
}

/// Validates a parsed configuration.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for route in &config.routes {
        if route.target.trim().is_empty() {
            errors.push(ValidationError::EmptyTarget {
                pattern: route.pattern.clone(),
            });
        }
        if let Some(methods) = &route.methods {
            if let Err(method) = Method::parse_list(&Methods::joined(methods)) {
                errors.push(ValidationError::UnknownMethod {
                    pattern: route.pattern.clone(),
                    method,
                });
            }
        }
        for segment in tokenize(&route.pattern) {
            if let Some(name) = segment.strip_prefix(PARAM_MARKER) {
                if name.is_empty() || name.starts_with(RESERVED_MARKER) {
                    errors.push(ValidationError::InvalidParameter {
                        pattern: route.pattern.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }
    }

    for (locale, map) in &config.localizations {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (canonical, localized) in map {
            if let Some(first) = seen.insert(localized, canonical) {
                errors.push(ValidationError::AmbiguousLocalization {
                    locale: locale.clone(),
                    value: localized.clone(),
                    first: first.to_string(),
                    second: canonical.clone(),
                });
            }
        }
    }

    for (key, handler) in &config.handlers {
        if key.parse::<u16>().map_or(true, |code| !(100..=599).contains(&code)) {
            errors.push(ValidationError::InvalidHandlerCode { key: key.clone() });
        }
        let name = match handler {
            crate::config::ErrorHandlerConfig::Single(name) => Some(name),
            crate::config::ErrorHandlerConfig::WithArgs(items) => items.first(),
        };
        if name.map_or(true, |n| n.trim().is_empty()) {
            errors.push(ValidationError::EmptyHandler { code: key.clone() });
        }
    }

    if config.router.allow_autoload {
        if config.router.default_method.trim().is_empty() {
            errors.push(ValidationError::MissingAutoloadSetting {
                field: "default_method",
            });
        }
        if config.router.default_controller.trim().is_empty() {
            errors.push(ValidationError::MissingAutoloadSetting {
                field: "default_controller",
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorHandlerConfig, RouteConfig};

    #[test]
    fn test_valid_config_passes() {
        let mut config = DispatchConfig::default();
        config.routes.push(RouteConfig::new("/users/$id", "UserCtrl#show").methods("get"));
        config
            .handlers
            .insert("404".into(), ErrorHandlerConfig::Single("not_found".into()));
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DispatchConfig::default();
        config.routes.push(RouteConfig::new("/a/$_id", "").methods("GET,FETCH"));
        config
            .handlers
            .insert("oops".into(), ErrorHandlerConfig::WithArgs(vec![]));
        config.localizations.insert(
            "de".into(),
            [("users", "leute"), ("people", "leute")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        config.router.allow_autoload = true;
        config.router.default_method = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::UnknownMethod {
            pattern: "/a/$_id".into(),
            method: "FETCH".into(),
        }));
        assert!(errors.contains(&ValidationError::AmbiguousLocalization {
            locale: "de".into(),
            value: "leute".into(),
            first: "people".into(),
            second: "users".into(),
        }));
    }
}
