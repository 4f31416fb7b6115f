//! Outcome to HTTP response conversion.
//!
//! # Responsibilities
//! - Emit redirects with their status and `Location` header
//! - Render handler values as text (strings) or JSON (everything else)
//! - Carry error-handler bodies with their status code

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::dispatch::Outcome;

/// Converts a dispatch outcome into a response.
pub fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Invoked { value } | Outcome::Rendered { value } => body(StatusCode::OK, value),
        Outcome::Redirected { location, status } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
            match HeaderValue::from_str(&location) {
                Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
                Err(e) => {
                    tracing::error!(%location, error = %e, "Redirect location is not a valid header");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Outcome::Failed { status, body: value } => body(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            value,
        ),
    }
}

fn body(status: StatusCode, value: Value) -> Response {
    match value {
        Value::Null => status.into_response(),
        Value::String(text) => (status, text).into_response(),
        other => (status, Json(other)).into_response(),
    }
}
