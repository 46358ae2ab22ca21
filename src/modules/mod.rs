pub mod config;
pub mod logger;

// Re-export common functions to the modules namespace
pub use config::*;
pub use logger::*;
