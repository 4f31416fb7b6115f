//! Error-handler collaborator.
//!
//! Not-found, forbidden and denied outcomes are routed here with a status
//! code. A registered handler produces the body; otherwise the body is
//! `"<code> - <message>"`.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::config::ErrorHandlerConfig;
use crate::error::{HandlerError, RouteError};
use crate::handler::{Args, CallableCheck, HandlerRegistry};
use crate::routing::target::HandlerRef;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ErrorHandler {
    target: HandlerRef,
    /// `None` for the single-reference form, which receives only the message.
    leading: Option<Vec<String>>,
}

/// Error handlers keyed by status code.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandlers {
    handlers: HashMap<u16, ErrorHandler>,
}

impl ErrorHandlers {
    pub fn from_config(config: &BTreeMap<String, ErrorHandlerConfig>) -> Self {
        let mut handlers = HashMap::new();
        for (key, handler) in config {
            let Ok(code) = key.parse::<u16>() else {
                tracing::warn!(key = %key, "Ignoring error handler with non-numeric key");
                continue;
            };
            let handler = match handler {
                ErrorHandlerConfig::Single(name) => ErrorHandler {
                    target: HandlerRef::parse(name),
                    leading: None,
                },
                ErrorHandlerConfig::WithArgs(items) => match items.split_first() {
                    Some((name, rest)) => ErrorHandler {
                        target: HandlerRef::parse(name),
                        leading: Some(rest.to_vec()),
                    },
                    None => continue,
                },
            };
            handlers.insert(code, handler);
        }
        Self { handlers }
    }

    /// Checks that every configured handler resolves, lowest code first.
    pub fn ensure_callable(&self, callables: &dyn CallableCheck) -> Result<(), RouteError> {
        let mut codes: Vec<_> = self.handlers.keys().copied().collect();
        codes.sort_unstable();
        for code in codes {
            callables.ensure_callable(&self.handlers[&code].target)?;
        }
        Ok(())
    }

    /// Produces the body for an error response.
    pub fn handle(
        &self,
        registry: &HandlerRegistry,
        code: u16,
        message: Option<&str>,
    ) -> Result<Value, HandlerError> {
        let Some(handler) = self.handlers.get(&code) else {
            return Ok(Value::String(match message {
                Some(message) if !message.is_empty() => format!("{} - {}", code, message),
                _ => code.to_string(),
            }));
        };

        let message = message.map(str::to_string);
        let args = match &handler.leading {
            None => Args::One(message),
            Some(leading) => {
                let mut list: Vec<Option<String>> = leading.iter().cloned().map(Some).collect();
                list.push(message);
                Args::List(list)
            }
        };
        registry.invoke(&handler.target, &args)
    }
}
