//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the HTTP gateway to the council backend and the
//! configuration file loader.

pub mod config;
pub mod http;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileServerConfig, FileUiConfig};
pub use http::gateway::HttpCouncilGateway;
