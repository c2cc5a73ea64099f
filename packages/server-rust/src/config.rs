//! Process configuration parsed from command-line flags and environment.
//!
//! Built once at startup, validated, then shared read-only (behind `Arc`)
//! with every component that needs it.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};

use crate::network::{NetworkConfig, TlsConfig};
use crate::versioning::ApiVersion;

/// Placeholder substituted with the version group name (e.g. `v1`) in
/// [`ApiSettings::openapi_address`].
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Errors reported by [`AppConfig::validate`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API name must not be empty")]
    EmptyApiName,
    #[error("JWT signing key must not be empty")]
    EmptySigningKey,
    #[error("OpenAPI address must contain the {VERSION_PLACEHOLDER} placeholder: {address}")]
    MissingVersionPlaceholder { address: String },
    #[error("TLS requires both a certificate and a key path")]
    IncompleteTls,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level configuration of the `keel-server` process.
#[derive(Debug, Clone, Parser)]
#[command(name = "keel-server", version, about = "Versioned, bearer-authenticated HTTP API host")]
pub struct AppConfig {
    #[command(flatten)]
    pub api: ApiSettings,

    #[command(flatten)]
    pub security: SecuritySettings,

    #[command(flatten)]
    pub network: NetworkArgs,

    /// Reject requests whose type has no registered rule set.
    #[arg(long, env = "STRICT_VALIDATION")]
    pub strict_validation: bool,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Port for the Prometheus scrape endpoint. Disabled when absent.
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

impl AppConfig {
    /// Checks cross-field constraints clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.name.trim().is_empty() {
            return Err(ConfigError::EmptyApiName);
        }
        if self.security.signing_key.is_empty() {
            return Err(ConfigError::EmptySigningKey);
        }
        if !self.api.openapi_address.contains(VERSION_PLACEHOLDER) {
            return Err(ConfigError::MissingVersionPlaceholder {
                address: self.api.openapi_address.clone(),
            });
        }
        self.network.to_network_config()?;
        Ok(())
    }
}

/// API identity and documentation settings.
#[derive(Debug, Clone, Args)]
pub struct ApiSettings {
    /// API name, used as the OpenAPI document title.
    #[arg(long = "api-name", env = "API_NAME", default_value = "keel")]
    pub name: String,

    #[arg(long = "api-major-version", env = "API_MAJOR_VERSION", default_value_t = 1)]
    pub major_version: u32,

    #[arg(long = "api-minor-version", env = "API_MINOR_VERSION", default_value_t = 0)]
    pub minor_version: u32,

    /// Path of the OpenAPI JSON document; `{version}` becomes the group name.
    #[arg(
        long = "openapi-address",
        env = "OPENAPI_ADDRESS",
        default_value = "/swagger/{version}/swagger.json"
    )]
    pub openapi_address: String,
}

impl ApiSettings {
    #[must_use]
    pub fn version(&self) -> ApiVersion {
        ApiVersion::new(self.major_version, self.minor_version)
    }

    /// OpenAPI document path with the version placeholder substituted.
    #[must_use]
    pub fn openapi_path(&self) -> String {
        self.openapi_address
            .replace(VERSION_PLACEHOLDER, &self.version().group_name())
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            name: "keel".to_string(),
            major_version: 1,
            minor_version: 0,
            openapi_address: "/swagger/{version}/swagger.json".to_string(),
        }
    }
}

/// Bearer token verification settings.
#[derive(Clone, Args)]
pub struct SecuritySettings {
    /// HMAC secret used to verify HS256 tokens.
    #[arg(long = "signing-key", env = "JWT_SIGNING_KEY", hide_env_values = true, default_value = "")]
    pub signing_key: String,

    /// Expected `aud` claim. Audience is not checked when absent.
    #[arg(long = "token-audience", env = "JWT_AUDIENCE")]
    pub token_audience: Option<String>,

    /// Clock skew tolerated when checking `exp`, in seconds.
    #[arg(long = "token-leeway-secs", env = "JWT_LEEWAY_SECS", default_value_t = 60)]
    pub token_leeway_secs: u64,
}

// Manual impl keeps the signing key out of logs.
impl std::fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("signing_key", &"<redacted>")
            .field("token_audience", &self.token_audience)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .finish()
    }
}

/// Listener and HTTP middleware settings.
#[derive(Debug, Clone, Args)]
pub struct NetworkArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long = "tls-cert", env = "TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long = "tls-key", env = "TLS_KEY")]
    pub tls_key: Option<PathBuf>,

    /// Allowed CORS origins, comma separated. `*` allows any origin.
    #[arg(long = "cors-origins", env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    #[arg(long = "request-timeout-secs", env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long = "body-limit-bytes", env = "BODY_LIMIT_BYTES", default_value_t = 2 * 1024 * 1024)]
    pub body_limit_bytes: usize,
}

impl NetworkArgs {
    /// Converts the flags into a [`NetworkConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteTls`] when only one of the TLS paths
    /// is set.
    pub fn to_network_config(&self) -> Result<NetworkConfig, ConfigError> {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            body_limit: self.body_limit_bytes,
        })
    }
}
