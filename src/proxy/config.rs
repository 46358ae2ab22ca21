use crate::models::CredentialBundle;
use crate::proxy::auth::{AuthSchemeKind, SignatureMethod};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MOUNT_PATH: &str = "/api/netsuite";
pub const DEFAULT_LISTING_PATH: &str = "/record/v1/customer?limit=5";
pub const DEFAULT_API_HOST: &str = "suitetalk.api.netsuite.com";
pub const DEFAULT_USER_AGENT: &str = "NetSuite-WorkflowAdmin-Proxy/1.0";

/// Reverse proxy server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Allow LAN access
    /// - false: only 127.0.0.1 (default)
    /// - true: bind 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token callers must present. Empty disables the check.
    #[serde(default)]
    pub api_key: String,

    /// Downstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Upstream proxy configuration
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    /// Enabled
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: default_port(),
            api_key: String::new(),
            request_timeout: default_request_timeout(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    8045
}

fn default_request_timeout() -> u64 {
    25
}

impl ProxyConfig {
    /// Get the actual listening address
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// NetSuite downstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetSuiteConfig {
    pub credentials: CredentialBundle,

    /// REST host suffix, prefixed with the account id
    pub api_host: String,

    /// Full base URL override (e.g. `http://127.0.0.1:9000/services/rest`)
    pub base_url: Option<String>,

    /// Inbound prefix stripped before forwarding
    pub mount_path: String,

    /// Path used when the caller asks for the bare mount point
    pub default_path: String,

    /// Ordered fallback chain, first success wins
    pub auth_chain: Vec<AuthSchemeKind>,

    pub oauth_signature_method: SignatureMethod,

    pub user_agent: String,
}

impl Default for NetSuiteConfig {
    fn default() -> Self {
        Self {
            credentials: CredentialBundle::default(),
            api_host: DEFAULT_API_HOST.to_string(),
            base_url: None,
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            default_path: DEFAULT_LISTING_PATH.to_string(),
            auth_chain: vec![AuthSchemeKind::Basic, AuthSchemeKind::OAuth1],
            oauth_signature_method: SignatureMethod::HmacSha1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NetSuiteConfig {
    /// REST root, e.g. `https://123456-sb1.suitetalk.api.netsuite.com/services/rest`
    pub fn base_url(&self) -> String {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        // Sandbox ids like 123456_SB1 map to 123456-sb1 in the hostname
        let host_account = self
            .credentials
            .account_id
            .trim()
            .to_lowercase()
            .replace('_', "-");
        format!("https://{}.{}/services/rest", host_account, self.api_host)
    }

    /// Absolute downstream URL for an inbound path
    pub fn downstream_url(&self, inbound_path: &str) -> String {
        let path = crate::proxy::common::utils::normalize_path(
            inbound_path,
            &self.mount_path,
            &self.default_path,
        );
        format!("{}{}", self.base_url(), path)
    }
}
