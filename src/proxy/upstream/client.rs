// Upstream client implementation
// One NetSuite REST call per inbound request, bounded by the configured timeout

use reqwest::{header, Client};
use std::time::Duration;

use crate::error::{AppResult, ProxyError};
use crate::proxy::common::utils::preview;
use crate::proxy::config::UpstreamProxyConfig;
use crate::proxy::models::{DownstreamResponse, NormalizedResponse, RequestDescriptor};

pub struct UpstreamClient {
    http_client: Client,
    timeout: Duration,
    user_agent: String,
}

impl UpstreamClient {
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        proxy_config: Option<UpstreamProxyConfig>,
    ) -> AppResult<Self> {
        let http_client =
            crate::utils::http::create_client_with_proxy(timeout, user_agent, proxy_config)?;

        Ok(Self {
            http_client,
            timeout,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_headers(&self, auth_header: &str) -> Result<header::HeaderMap, ProxyError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(auth_header).map_err(|e| {
                ProxyError::DownstreamNetwork {
                    message: "Authorization header contains invalid characters".to_string(),
                    cause: Some(e.to_string()),
                }
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Ok(ua) = header::HeaderValue::from_str(&self.user_agent) {
            headers.insert(header::USER_AGENT, ua);
        }
        Ok(headers)
    }

    /// Issue the downstream call and read the whole body.
    ///
    /// The call is dropped when the timeout elapses; no retries.
    pub async fn send(
        &self,
        url: &str,
        request: &RequestDescriptor,
        auth_header: &str,
    ) -> Result<DownstreamResponse, ProxyError> {
        let headers = self.build_headers(auth_header)?;

        let mut builder = self
            .http_client
            .request(request.method.clone(), url)
            .headers(headers);

        if let Some(body) = request.outbound_body() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        tracing::info!("NetSuite response status: {}", status);

        Ok(DownstreamResponse {
            status,
            headers: response_headers,
            body,
        })
    }

    /// Forward and normalize
    pub async fn forward(
        &self,
        url: &str,
        request: &RequestDescriptor,
        auth_header: &str,
    ) -> Result<NormalizedResponse, ProxyError> {
        let downstream = self.send(url, request, auth_header).await?;
        let normalized = downstream.normalize();

        if normalized.is_parse_fallback() {
            tracing::warn!(
                "NetSuite returned non-JSON body (status {}), wrapping as raw text",
                downstream.status
            );
        }
        tracing::debug!("NetSuite response: {}", preview(&downstream.text(), 200));

        Ok(normalized)
    }

    fn map_error(&self, e: reqwest::Error) -> ProxyError {
        if e.is_timeout() {
            ProxyError::DownstreamTimeout {
                timeout: self.timeout,
            }
        } else {
            ProxyError::from(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Bytes,
        http::{HeaderMap, Method, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use crate::proxy::upstream::test_support::{spawn_stalled_downstream, wait_for};
    use tokio::sync::Mutex;

    /// What the fake NetSuite saw
    #[derive(Debug, Clone, Default)]
    struct Captured {
        method: String,
        path: String,
        headers: HeaderMap,
        body: Vec<u8>,
    }

    async fn spawn_downstream(status: StatusCode, reply: &'static str) -> (String, Arc<Mutex<Option<Captured>>>) {
        let captured: Arc<Mutex<Option<Captured>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let app = Router::new().fallback(
            move |method: Method, uri: axum::http::Uri, headers: HeaderMap, body: Bytes| {
                let sink = sink.clone();
                async move {
                    *sink.lock().await = Some(Captured {
                        method: method.to_string(),
                        path: uri.to_string(),
                        headers,
                        body: body.to_vec(),
                    });
                    (status, reply)
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/services/rest", addr), captured)
    }

    fn client(timeout: Duration) -> UpstreamClient {
        UpstreamClient::new(timeout, "NetSuite-WorkflowAdmin-Proxy/1.0", None).unwrap()
    }

    #[tokio::test]
    async fn test_get_is_forwarded_without_body() {
        let (base, captured) = spawn_downstream(StatusCode::OK, r#"{"id":123}"#).await;
        let url = format!("{}/record/v1/customer/123", base);
        let request = RequestDescriptor::new(Method::GET, "/api/netsuite/record/v1/customer/123")
            .with_body(json!({"ignored": true}));

        let normalized = client(Duration::from_secs(5))
            .forward(&url, &request, "Basic abc")
            .await
            .unwrap();

        assert_eq!(normalized.status, StatusCode::OK);
        assert_eq!(normalized.body, json!({"id": 123}));

        let seen = captured.lock().await.clone().unwrap();
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.path, "/services/rest/record/v1/customer/123");
        assert!(seen.body.is_empty());
        assert_eq!(seen.headers["authorization"], "Basic abc");
        assert_eq!(seen.headers["content-type"], "application/json");
        assert_eq!(seen.headers["accept"], "application/json");
        assert_eq!(seen.headers["user-agent"], "NetSuite-WorkflowAdmin-Proxy/1.0");
    }

    #[tokio::test]
    async fn test_post_body_is_sent_as_json() {
        let (base, captured) = spawn_downstream(StatusCode::NO_CONTENT, "").await;
        let body = json!({"companyName": "Acme", "subsidiary": {"id": "1"}});
        let request = RequestDescriptor::new(Method::POST, "/api/netsuite/record/v1/customer")
            .with_body(body.clone());

        let normalized = client(Duration::from_secs(5))
            .forward(&format!("{}/record/v1/customer", base), &request, "Basic abc")
            .await
            .unwrap();

        assert_eq!(normalized.status, StatusCode::NO_CONTENT);
        let seen = captured.lock().await.clone().unwrap();
        assert_eq!(seen.method, "POST");
        assert_eq!(serde_json::from_slice::<Value>(&seen.body).unwrap(), body);
    }

    #[tokio::test]
    async fn test_non_json_reply_keeps_status() {
        let (base, _) = spawn_downstream(StatusCode::BAD_REQUEST, "plain failure").await;
        let request = RequestDescriptor::new(Method::GET, "/api/netsuite/x");

        let normalized = client(Duration::from_secs(5))
            .forward(&format!("{}/x", base), &request, "Basic abc")
            .await
            .unwrap();

        assert_eq!(normalized.status, StatusCode::BAD_REQUEST);
        assert_eq!(normalized.body["raw"], "plain failure");
        assert_eq!(normalized.body["status"], 400);
    }

    #[tokio::test]
    async fn test_slow_downstream_times_out() {
        let (base, closed) = spawn_stalled_downstream().await;

        let request = RequestDescriptor::new(Method::GET, "/api/netsuite/slow");
        let started = std::time::Instant::now();
        let err = client(Duration::from_millis(300))
            .forward(&format!("{}/slow", base), &request, "Basic abc")
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::DownstreamTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
        // The abandoned call must not keep the connection open
        assert!(wait_for(&closed).await, "downstream connection still open after timeout");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = RequestDescriptor::new(Method::GET, "/api/netsuite/x");
        let err = client(Duration::from_secs(5))
            .forward(&format!("http://{}/x", addr), &request, "Basic abc")
            .await
            .unwrap_err();

        assert_eq!(err.name(), "DownstreamNetworkError");
    }

    #[tokio::test]
    async fn test_invalid_header_value_is_rejected_before_sending() {
        let request = RequestDescriptor::new(Method::GET, "/api/netsuite/x");
        let err = client(Duration::from_secs(5))
            .forward("http://127.0.0.1:9/x", &request, "Basic a\nb")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }
}
