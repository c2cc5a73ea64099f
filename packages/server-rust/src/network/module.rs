//! Network module with deferred startup lifecycle.
//!
//! `new()` creates shared state, `start()` binds the TCP listener, and
//! `serve()` starts accepting connections. Domain routes can be added with
//! `with_versioned_routes()` any time before `serve()`.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{
    caller_handler, health_handler, liveness_handler, ping_handler, readiness_handler, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::auth::require_bearer;
use crate::config::ApiSettings;
use crate::openapi::swagger_router;
use crate::service::ResponseOrchestrator;
use crate::traits::TokenReader;
use crate::versioning::negotiate_version;

/// Maximum time to wait for in-flight calls after the shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Manages the HTTP server lifecycle.
///
/// Routes:
/// - `GET /ping` -- anonymous connectivity check
/// - `GET /health`, `/health/live`, `/health/ready` -- probes
/// - `GET /swagger-ui` and the configured OpenAPI JSON address
/// - `/v{major}/...` -- versioned routes, bearer token required
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
    versioned: Router<AppState>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(
        config: NetworkConfig,
        api: ApiSettings,
        orchestrator: Arc<ResponseOrchestrator>,
        token_reader: Arc<dyn TokenReader>,
    ) -> Self {
        let state = AppState {
            orchestrator,
            token_reader,
            shutdown: Arc::new(ShutdownController::new()),
            api: Arc::new(api),
            start_time: Instant::now(),
        };

        Self {
            config,
            listener: None,
            state,
            versioned: Router::new().route("/caller", get(caller_handler)),
        }
    }

    /// Adds routes served under the version prefix, behind the bearer guard.
    #[must_use]
    pub fn with_versioned_routes(mut self, routes: Router<AppState>) -> Self {
        self.versioned = self.versioned.merge(routes);
        self
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let version = self.state.api.version();

        let versioned = self
            .versioned
            .clone()
            .route_layer(from_fn_with_state(version, negotiate_version))
            .route_layer(from_fn_with_state(
                Arc::clone(&self.state.token_reader),
                require_bearer,
            ));

        Router::new()
            .route("/ping", get(ping_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .nest(&version.path_prefix(), versioned)
            .merge(swagger_router(&self.state.api))
            .layer(build_http_layers(&self.config, version))
            .with_state(self.state.clone())
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves connections until `shutdown` resolves.
    ///
    /// On the signal the controller moves to Draining and cancels its token,
    /// so in-flight orchestrated calls end with 503. The server then waits up
    /// to 30 seconds for them before reporting Stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, if TLS material
    /// cannot be loaded, or on a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let Some(listener) = self.listener else {
            anyhow::bail!("start() must be called before serve()");
        };
        let shutdown_ctrl = Arc::clone(&self.state.shutdown);

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        let signal = async move {
            shutdown.await;
            info!("Shutdown signal received, draining");
            signal_ctrl.trigger_shutdown();
        };

        // Transition to Ready so readiness probes pass.
        shutdown_ctrl.set_ready();

        if let Some(ref tls_config) = self.config.tls {
            serve_tls(listener, router, tls_config, signal).await?;
        } else {
            serve_plain(listener, router, signal).await?;
        }

        drain(&shutdown_ctrl).await;
        Ok(())
    }
}

/// Serves plain HTTP connections using axum's built-in server.
async fn serve_plain(
    listener: TcpListener,
    router: Router,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Serving plain HTTP connections");

    axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await?;
    Ok(())
}

/// Serves TLS connections using `axum-server` with rustls.
///
/// Reuses the pre-bound TCP listener by converting it to a `std::net::TcpListener`.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls_config: &TlsConfig,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls_config.cert_path, &tls_config.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        signal.await;
        shutdown_handle.graceful_shutdown(Some(DRAIN_TIMEOUT));
    });

    info!("Serving TLS connections on {}", addr);

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

/// Waits for in-flight calls and transitions to Stopped.
async fn drain(shutdown_ctrl: &ShutdownController) {
    // Covers a server that exited without the signal firing.
    shutdown_ctrl.trigger_shutdown();

    let in_flight = shutdown_ctrl.in_flight_count();
    if in_flight > 0 {
        info!("Waiting for {} in-flight calls", in_flight);
    }

    if shutdown_ctrl.wait_for_drain(DRAIN_TIMEOUT).await {
        info!("All in-flight calls drained");
    } else {
        warn!("Drain timeout expired with in-flight calls remaining");
    }
}
