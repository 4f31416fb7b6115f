//! Serves a small users API through the dispatcher.
//!
//! ```text
//! cargo run --example users
//! curl localhost:8080/users/42
//! curl -i localhost:8080/admin      # 302 to /login?from=%2Fadmin
//! ```

use std::sync::Arc;

use dispatch_router::config::parse_config;
use dispatch_router::handler::{Controller, HandlerRegistry};
use dispatch_router::observability::logging::init_logging;
use dispatch_router::Dispatcher;
use serde_json::json;

const CONFIG: &str = r#"
[router]
default_route = "users"
forbidden_prefix = "_"
static_renderer = "page"

[[routes]]
pattern = "/users/$id"
target = "Users#show"
methods = "GET"

[[routes]]
pattern = "/users"
target = "Users#list"
methods = ["GET", "POST"]

[[routes]]
pattern = "/admin"
target = "Users#list"
filter = "is_admin"
redirect = "/login?from={route}"

[handlers]
404 = "not_found"
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_config(CONFIG)?;
    init_logging(&config.observability.log_level);

    let registry = HandlerRegistry::new()
        .controller(
            "Users",
            Controller::new()
                .method("list", |_| Ok(json!([{ "id": "1", "name": "ada" }])))
                .method("show", |args| Ok(json!({ "id": args.param("id") }))),
        )
        .function("is_admin", |_| Ok(json!(false)))
        .function("page", |args| Ok(json!(format!("static page {}", args.get(0).unwrap_or_default()))))
        .function("not_found", |args| Ok(json!({ "error": args.get(0) })));

    let dispatcher = Arc::new(Dispatcher::new(&config, registry)?);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
    dispatch_router::http::serve(listener, dispatcher).await?;
    Ok(())
}
