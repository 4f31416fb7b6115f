//! HTTP adapter tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use dispatch_router::config::RouteConfig;
use dispatch_router::dispatch::Dispatcher;
use dispatch_router::error::HandlerError;
use dispatch_router::http::app;
use tower::ServiceExt;

mod common;

fn dispatcher() -> Arc<Dispatcher> {
    let (registry, _) = common::registry();
    let registry = registry
        .function("hello", |_| Ok(serde_json::json!("hello world")))
        .function("boom", |_| Err(HandlerError::new("boom")));
    let mut config = common::users_config();
    config.routes.push(RouteConfig::new("/hello", "hello"));
    config.routes.push(RouteConfig::new("/boom", "boom"));
    config.routes.push(
        RouteConfig::new("/admin", "hello")
            .filter("deny")
            .redirect("/login?from={route}"),
    );
    Arc::new(Dispatcher::new(&config, registry).unwrap())
}

async fn send(method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app(dispatcher()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_text_body() {
    let (status, _, body) = send("GET", "/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello world");
}

#[tokio::test]
async fn test_json_body_with_params() {
    let (status, headers, body) = send("GET", "/users/42?tab=posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(body, r#"{"user":"42"}"#);
}

#[tokio::test]
async fn test_method_mismatch_is_404() {
    let (status, _, body) = send("DELETE", "/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 - Template not found");
}

#[tokio::test]
async fn test_denied_request_redirects() {
    let (status, headers, _) = send("GET", "/admin").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/login?from=%2Fadmin");
}

#[tokio::test]
async fn test_handler_error_is_500() {
    let (status, _, _) = send("GET", "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
