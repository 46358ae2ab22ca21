use crate::proxy::{NetSuiteConfig, ProxyConfig};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub netsuite: NetSuiteConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
