//! Console key authentication.
//!
//! The dashboard presents the key in `x-api-key` or as a Bearer token.
//! Comparison is constant-time.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppErrorWithRevision};
use crate::AppState;

/// Header name for the console key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject `/api` requests that do not carry the configured key.
///
/// With no key configured every request passes (local development).
pub async fn require_console_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_psk.as_deref() else {
        return next.run(request).await;
    };

    match presented_key(request.headers()) {
        Some(key) if keys_match(key, expected) => next.run(request).await,
        Some(_) => reject("Invalid API key"),
        None => reject("Missing API key"),
    }
}

/// Key from `x-api-key`, falling back to `Authorization: Bearer`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

fn keys_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn reject(message: &str) -> Response {
    tracing::warn!("Rejected console request: {}", message);
    AppErrorWithRevision {
        error: AppError::Unauthorized(message.to_string()),
        revision_id: 0,
    }
    .into_response()
}
