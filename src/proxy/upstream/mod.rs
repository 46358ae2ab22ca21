// Upstream module - NetSuite REST client

pub mod client;
#[cfg(test)]
pub(crate) mod test_support;

pub use client::UpstreamClient;
