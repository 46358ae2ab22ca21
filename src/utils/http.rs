use crate::error::AppResult;
use crate::proxy::config::UpstreamProxyConfig;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Create an HTTP client with specified proxy configuration.
///
/// Idle connections are not kept, so nothing is reused across requests.
pub fn create_client_with_proxy(
    timeout: Duration,
    user_agent: &str,
    proxy_config: Option<UpstreamProxyConfig>,
) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .pool_max_idle_per_host(0);

    if let Some(config) = proxy_config {
        if config.enabled && !config.url.is_empty() {
            match Proxy::all(&config.url) {
                Ok(proxy) => {
                    builder = builder.proxy(proxy);
                    tracing::info!("HTTP client upstream proxy enabled: {}", config.url);
                }
                Err(e) => {
                    tracing::error!("Invalid proxy address: {}, error: {}", config.url, e);
                }
            }
        }
    }

    Ok(builder.build()?)
}
