//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatching fallback
//! - Wire up the tracing layer
//! - Bind to a listener and shut down on Ctrl+C

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::http::response::outcome_response;

/// Builds the Axum application for `dispatcher`.
pub fn app(dispatcher: Arc<Dispatcher>) -> Router {
    Router::<Arc<Dispatcher>>::new()
        .fallback(dispatch_handler)
        .with_state(dispatcher)
        .layer(TraceLayer::new_for_http())
}

/// Serves `dispatcher` on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, app(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response {
    let method = request.method().as_str().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let task_target = target.clone();
    let result =
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&task_target, &method)).await;

    match result {
        Ok(Ok(dispatched)) => outcome_response(dispatched.outcome),
        Ok(Err(e)) => {
            tracing::error!(path = %target, error = %e, "Dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Err(e) => {
            tracing::error!(path = %target, error = %e, "Dispatch task aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
