use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::CredentialFlags;
use crate::proxy::auth::SchemeFailure;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

// Implement alias for Result to simplify usage
pub type AppResult<T> = Result<T, AppError>;

/// Failures on the request path. Every variant is reported to the caller as a 500.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("NetSuite credentials not configured")]
    Configuration { missing: CredentialFlags },

    #[error("All authentication schemes failed: {}", describe_failures(.failures))]
    AuthSetup { failures: Vec<SchemeFailure> },

    #[error("NetSuite did not respond within {}ms", .timeout.as_millis())]
    DownstreamTimeout { timeout: Duration },

    #[error("{message}")]
    DownstreamNetwork {
        message: String,
        cause: Option<String>,
    },
}

fn describe_failures(failures: &[SchemeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.scheme, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Non-sensitive context attached to error bodies
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Which credential fields are set (never their values)
    pub config: CredentialFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
}

impl ProxyError {
    pub fn name(&self) -> &'static str {
        match self {
            ProxyError::Configuration { .. } => "ConfigurationError",
            ProxyError::AuthSetup { .. } => "AuthSetupError",
            ProxyError::DownstreamTimeout { .. } => "DownstreamTimeoutError",
            ProxyError::DownstreamNetwork { .. } => "DownstreamNetworkError",
        }
    }

    /// Build the JSON error body returned to the caller
    pub fn to_body(&self, diagnostics: &Diagnostics) -> Value {
        let mut body = match self {
            ProxyError::Configuration { missing } => json!({
                "error": self.to_string(),
                "name": self.name(),
                "message": "Set the NETSUITE_* environment variables or the netsuite.credentials config section",
                "missing": missing,
            }),
            ProxyError::AuthSetup { failures } => json!({
                "error": "Authentication setup failed",
                "name": self.name(),
                "message": self.to_string(),
                "attempts": failures,
            }),
            ProxyError::DownstreamTimeout { .. } => json!({
                "error": "Proxy server error",
                "name": self.name(),
                "message": self.to_string(),
            }),
            ProxyError::DownstreamNetwork { message, cause } => {
                let mut body = json!({
                    "error": "Proxy server error",
                    "name": self.name(),
                    "message": message,
                });
                if let Some(cause) = cause {
                    body["cause"] = Value::String(cause.clone());
                }
                body
            }
        };

        // The missing map already tells the whole story for configuration errors
        if !matches!(self, ProxyError::Configuration { .. }) {
            if let (Some(obj), Value::Object(extra)) = (
                body.as_object_mut(),
                serde_json::to_value(diagnostics).unwrap_or_else(|_| Value::Object(Map::new())),
            ) {
                obj.extend(extra);
            }
        }

        body
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        let cause = std::error::Error::source(&e).map(|s| s.to_string());
        let message = if e.is_connect() {
            format!("Failed to connect to NetSuite: {}", e)
        } else {
            format!("HTTP request failed: {}", e)
        };
        ProxyError::DownstreamNetwork { message, cause }
    }
}
