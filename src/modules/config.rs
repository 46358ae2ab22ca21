use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;
use crate::proxy::auth::{AuthSchemeKind, SignatureMethod};

const DATA_DIR: &str = ".netsuite_proxy";
const CONFIG_FILE: &str = "config.json";
const CONFIG_PATH_ENV: &str = "NETSUITE_PROXY_CONFIG";

/// Get data directory path
pub fn get_data_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Failed to get user home directory")?;
    let data_dir = home.join(DATA_DIR);

    // Ensure directory exists
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(DATA_DIR).join(CONFIG_FILE))
}

/// Load application config: JSON file (if any), then environment variables, then validation
pub fn load_app_config() -> AppResult<AppConfig> {
    let mut config = match config_path() {
        Some(path) if path.exists() => load_config_file(&path)?,
        _ => AppConfig::new(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

fn load_config_file(path: &Path) -> AppResult<AppConfig> {
    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
    })?;
    tracing::info!("Loaded config file {:?}", path);
    Ok(config)
}

/// Overlay environment variables on top of `config`.
///
/// `lookup` returns the raw variable value; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let credentials = &mut config.netsuite.credentials;
    for (key, field) in [
        ("NETSUITE_ACCOUNT_ID", &mut credentials.account_id),
        ("NETSUITE_CONSUMER_KEY", &mut credentials.consumer_key),
        ("NETSUITE_CONSUMER_SECRET", &mut credentials.consumer_secret),
        ("NETSUITE_USERNAME", &mut credentials.username),
        ("NETSUITE_PASSWORD", &mut credentials.password),
        ("NETSUITE_ROLE", &mut credentials.role),
    ] {
        if let Some(value) = get(key) {
            *field = value;
        }
    }

    if let Some(host) = get("NETSUITE_API_HOST") {
        config.netsuite.api_host = host;
    }
    if let Some(url) = get("NETSUITE_BASE_URL") {
        config.netsuite.base_url = Some(url);
    }

    if let Some(chain) = get("NETSUITE_AUTH_CHAIN") {
        config.netsuite.auth_chain = chain
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                AuthSchemeKind::parse(s).ok_or_else(|| {
                    AppError::Config(format!("Unknown auth scheme in NETSUITE_AUTH_CHAIN: {}", s))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
    }

    if let Some(method) = get("NETSUITE_OAUTH_SIGNATURE_METHOD") {
        config.netsuite.oauth_signature_method = SignatureMethod::parse(&method).ok_or_else(|| {
            AppError::Config(format!("Unsupported OAuth signature method: {}", method))
        })?;
    }

    if let Some(port) = get("PROXY_PORT") {
        config.proxy.port = port
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid PROXY_PORT: {}", port)))?;
    }
    if let Some(allow) = get("PROXY_ALLOW_LAN_ACCESS") {
        config.proxy.allow_lan_access = matches!(
            allow.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(key) = get("PROXY_API_KEY").or_else(|| get("AUTH_TOKEN")) {
        config.proxy.api_key = key;
    }
    if let Some(timeout) = get("PROXY_REQUEST_TIMEOUT") {
        config.proxy.request_timeout = timeout.trim().parse().map_err(|_| {
            AppError::Config(format!("Invalid PROXY_REQUEST_TIMEOUT: {}", timeout))
        })?;
    }
    if let Some(url) = get("UPSTREAM_PROXY_URL") {
        config.proxy.upstream_proxy.enabled = true;
        config.proxy.upstream_proxy.url = url;
    }

    Ok(())
}

/// Reject settings the proxy cannot run with. Missing credentials are not fatal here.
pub fn validate(config: &AppConfig) -> AppResult<()> {
    if config.netsuite.auth_chain.is_empty() {
        return Err(AppError::Config("auth_chain must name at least one scheme".to_string()));
    }
    if config.proxy.request_timeout == 0 {
        return Err(AppError::Config("request_timeout must be greater than zero".to_string()));
    }
    if let Some(base_url) = config.netsuite.base_url.as_deref() {
        url::Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid base_url {}: {}", base_url, e)))?;
    }
    if !config.netsuite.mount_path.is_empty() && !config.netsuite.mount_path.starts_with('/') {
        return Err(AppError::Config(format!(
            "mount_path must start with '/': {}",
            config.netsuite.mount_path
        )));
    }
    Ok(())
}
