//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dispatch_router::config::{DispatchConfig, RouteConfig};
use dispatch_router::error::HandlerError;
use dispatch_router::handler::{Args, Controller, HandlerRegistry};
use serde_json::{json, Value};

/// Positional arguments of every recorded call, in order.
pub type CallLog = Arc<Mutex<Vec<(String, Vec<Option<String>>)>>>;

/// The users routes most tests start from.
pub fn users_config() -> DispatchConfig {
    let mut config = DispatchConfig::default();
    config.routes = vec![
        RouteConfig::new("/users/$id", "UserCtrl#show").methods("GET"),
        RouteConfig::new("/users", "UserCtrl#list").methods("GET,POST"),
    ];
    config
}

/// A registry with the users controller plus a few free functions.
///
/// `render`, `not_found` and `render_error` record their arguments in the
/// returned log.
pub fn registry() -> (HandlerRegistry, CallLog) {
    let log: CallLog = Arc::default();

    let registry = HandlerRegistry::new()
        .controller(
            "UserCtrl",
            Controller::new()
                .method("show", |args| Ok(json!({ "user": args.param("id") })))
                .method("list", |_| Ok(json!(["ada", "grace"]))),
        )
        .function("allow", |_| Ok(json!(true)))
        .function("deny", |_| Ok(json!(false)))
        .function("is_admin", |args| Ok(json!(args.get(0).as_deref() == Some("1"))))
        .function("login_page", |args| Ok(json!(format!("login for {:?}", args.get(0)))))
        .function("render", recorder("render", &log))
        .function("not_found", recorder("not_found", &log))
        .function("render_error", recorder("render_error", &log));

    (registry, log)
}

fn recorder(
    name: &'static str,
    log: &CallLog,
) -> impl Fn(&Args) -> Result<Value, HandlerError> + Send + Sync + 'static {
    let log = log.clone();
    move |args: &Args| {
        let positional = args.positional();
        log.lock().unwrap().push((name.to_string(), positional.clone()));
        Ok(json!({ "handler": name, "args": positional }))
    }
}

/// Names and arguments recorded so far.
pub fn calls(log: &CallLog) -> Vec<(String, Vec<Option<String>>)> {
    log.lock().unwrap().clone()
}

/// Shorthand for building owned positional argument lists.
pub fn args(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}
