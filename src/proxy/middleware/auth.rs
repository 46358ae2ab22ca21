// API Key authentication middleware
use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::proxy::server::AppState;

/// Paths that never require the caller token
const PUBLIC_PATHS: &[&str] = &["/healthz"];

/// Require `Authorization: Bearer <key>` or `x-api-key: <key>` when an API key is configured
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    tracing::debug!("Request: {} {}", request.method(), request.uri());

    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    if request.method() == Method::OPTIONS || PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let api_key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| {
            request
                .headers()
                .get("x-api-key")
                .and_then(|h| h.to_str().ok())
        });

    let verdict = match api_key {
        None => Err((StatusCode::UNAUTHORIZED, "Missing bearer token")),
        Some(key) if bool::from(key.as_bytes().ct_eq(expected.as_bytes())) => Ok(()),
        Some(_) => Err((StatusCode::FORBIDDEN, "Invalid token")),
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err((status, message)) => {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri(), message);
            (status, Json(json!({ "error": message }))).into_response()
        }
    }
}
