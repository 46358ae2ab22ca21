// proxy module - NetSuite REST proxy service

pub mod auth; // Authorization header negotiation
pub mod common; // Common tools
pub mod config;
pub mod handlers; // API endpoint handlers
pub mod middleware; // Axum middleware
pub mod models;
pub mod server;
pub mod upstream; // Upstream client

pub use config::{NetSuiteConfig, ProxyConfig};
pub use server::AxumServer;
