use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use serde_json::{json, Value};

/// Inbound request, already parsed by the host
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path plus query, still carrying the mount prefix
    pub path: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Build from raw request parts. Non-JSON payloads are carried as a JSON string.
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: &[u8]) -> Self {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        let body = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice::<Value>(body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
            )
        };

        Self {
            method,
            path,
            body,
            headers,
        }
    }

    /// Whether this method may carry a request body downstream
    pub fn allows_body(&self) -> bool {
        !matches!(self.method, Method::GET | Method::DELETE | Method::HEAD)
    }

    /// JSON text to send downstream, if any
    pub fn outbound_body(&self) -> Option<String> {
        if !self.allows_body() {
            return None;
        }
        self.body.as_ref().map(Value::to_string)
    }
}

/// Raw downstream reply
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DownstreamResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON, wrapping it as `{raw, status, parseError}` when that fails.
    /// The status code is never rewritten.
    pub fn normalize(&self) -> NormalizedResponse {
        let text = self.text();
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(e) => json!({
                "raw": text,
                "status": self.status.as_u16(),
                "parseError": e.to_string(),
            }),
        };
        NormalizedResponse {
            status: self.status,
            body,
        }
    }
}

/// Uniform response returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl NormalizedResponse {
    pub fn internal_error(body: Value) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }
    }

    /// Whether the body is the raw-text wrapper
    pub fn is_parse_fallback(&self) -> bool {
        self.body.get("parseError").is_some() && self.body.get("raw").is_some()
    }
}

impl IntoResponse for NormalizedResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
