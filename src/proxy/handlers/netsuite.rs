// NetSuite Handler
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::Instrument;

use crate::error::{Diagnostics, ProxyError};
use crate::proxy::common::utils::generate_random_id;
use crate::proxy::middleware::cors::{ALLOWED_HEADERS, ALLOWED_METHODS};
use crate::proxy::models::{NormalizedResponse, RequestDescriptor};
use crate::proxy::server::AppState;

/// Entry point for everything under the mount path
pub async fn handle_netsuite(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if !is_mounted(uri.path(), &state.netsuite.mount_path) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Not found",
                "message": format!("Only {} is proxied", state.netsuite.mount_path),
            })),
        )
            .into_response();
    }

    // Plain OPTIONS (preflight requests are answered by the CORS layer)
    if method == Method::OPTIONS {
        return (
            StatusCode::OK,
            [
                (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
            ],
        )
            .into_response();
    }

    if !matches!(
        method,
        Method::GET | Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    ) {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({
                "error": "Method not allowed",
                "message": format!("{} is not supported, use one of: {}", method, ALLOWED_METHODS),
            })),
        )
            .into_response();
    }

    // Oversized or unreadable bodies still get a JSON answer
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(json!({
                    "error": "Invalid request body",
                    "message": rejection.body_text(),
                })),
            )
                .into_response();
        }
    };

    let request = RequestDescriptor::from_parts(method, &uri, headers, &body);
    let span = tracing::info_span!("netsuite", request_id = %generate_random_id());

    process_request(&state, &request)
        .instrument(span)
        .await
        .into_response()
}

/// Run one request through configuration check, auth selection and forwarding.
///
/// Never fails: every error becomes a normalized 500.
pub async fn process_request(state: &AppState, request: &RequestDescriptor) -> NormalizedResponse {
    let mut diagnostics = Diagnostics {
        config: state.netsuite.credentials.presence(),
        ..Default::default()
    };

    match forward_request(state, request, &mut diagnostics).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ProxyError::Configuration { .. } => {
                    tracing::warn!(error = e.name(), "Rejected request: {}", e)
                }
                _ => tracing::error!(error = e.name(), "Proxy error: {}", e),
            }
            NormalizedResponse::internal_error(e.to_body(&diagnostics))
        }
    }
}

async fn forward_request(
    state: &AppState,
    request: &RequestDescriptor,
    diagnostics: &mut Diagnostics,
) -> Result<NormalizedResponse, ProxyError> {
    let credentials = &state.netsuite.credentials;
    if !credentials.is_configured() {
        return Err(ProxyError::Configuration {
            missing: credentials.missing(),
        });
    }

    let url = state.netsuite.downstream_url(&request.path);
    diagnostics.url = Some(url.clone());

    let auth = state
        .selector
        .select(credentials, &url, request.method.as_str())?;
    diagnostics.auth_method = Some(auth.scheme.to_string());

    tracing::info!(
        method = %request.method,
        url = %url,
        auth = %auth.scheme,
        "Proxying request to NetSuite"
    );

    state.upstream.forward(&url, request, &auth.header).await
}

/// `path` equals the mount point or sits below it
fn is_mounted(path: &str, mount_path: &str) -> bool {
    let mount = mount_path.trim_end_matches('/');
    if mount.is_empty() {
        return true;
    }
    match path.strip_prefix(mount) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
