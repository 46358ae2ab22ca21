use crate::error::{AppError, AppResult};
use crate::models::AppConfig;
use crate::proxy::auth::AuthSelector;
use crate::proxy::config::NetSuiteConfig;
use crate::proxy::upstream::client::UpstreamClient;
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Matches the 1mb body limit of the original deployment
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Axum application state. Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub netsuite: Arc<NetSuiteConfig>,
    pub selector: Arc<AuthSelector>,
    pub upstream: Arc<UpstreamClient>,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let upstream_proxy = Some(config.proxy.upstream_proxy.clone());
        let upstream = UpstreamClient::new(
            Duration::from_secs(config.proxy.request_timeout),
            &config.netsuite.user_agent,
            upstream_proxy,
        )?;

        Ok(Self {
            netsuite: Arc::new(config.netsuite.clone()),
            selector: Arc::new(AuthSelector::new(
                config.netsuite.auth_chain.clone(),
                config.netsuite.oauth_signature_method,
            )),
            upstream: Arc::new(upstream),
            api_key: config.proxy.api_key().map(Arc::from),
        })
    }
}

/// Build routes
pub fn build_router(state: AppState) -> Router {
    use crate::proxy::handlers;

    Router::new()
        .route("/healthz", get(health_check_handler))
        // Mount path and everything below it; other paths get a JSON 404
        .fallback(handlers::netsuite::handle_netsuite)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::proxy::middleware::auth_middleware,
        ))
        .layer(crate::proxy::middleware::cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(config: &AppConfig) -> AppResult<(Self, tokio::task::JoinHandle<()>)> {
        let state = AppState::from_config(config)?;

        if !state.netsuite.credentials.is_configured() {
            tracing::warn!(
                "NetSuite credentials are incomplete, requests will be answered with a configuration error: {:?}",
                state.netsuite.credentials.missing()
            );
        }
        tracing::info!(
            "Auth chain: {:?}, OAuth signature method: {}",
            state.selector.chain(),
            state.netsuite.oauth_signature_method.as_str()
        );

        let app = build_router(state);

        // Bind address
        let addr = format!("{}:{}", config.proxy.get_bind_address(), config.proxy.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Server(format!("Failed to bind address {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            "NetSuite proxy started at http://{}{}",
            local_addr,
            config.netsuite.mount_path
        );

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
            local_addr,
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("NetSuite proxy stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "ts": chrono::Utc::now().timestamp(),
    }))
    .into_response()
}
