//! Keel Server: versioned, bearer-authenticated HTTP API host.
//!
//! Every domain call runs through the [`ResponseOrchestrator`], which
//! validates the request, invokes the handler, and maps its [`Envelope`]
//! to an HTTP response.
//!
//! [`Envelope`]: keel_core::Envelope

pub mod auth;
pub mod config;
pub mod network;
pub mod openapi;
pub mod service;
pub mod telemetry;
pub mod traits;
pub mod versioning;

pub use config::{ApiSettings, AppConfig, ConfigError, LogFormat};
pub use network::{AppState, NetworkConfig, NetworkModule};
pub use service::{ApiResponse, ExecuteOptions, ResponseOrchestrator};
pub use traits::{FailureLogger, TokenReader, TracingFailureLogger};
pub use versioning::ApiVersion;
