use std::sync::Arc;

use clap::Parser;
use keel_core::RequestValidator;
use keel_server::auth::JwtTokenReader;
use keel_server::network::handlers::register_rule_sets;
use keel_server::telemetry::{init_metrics, init_tracing};
use keel_server::{AppConfig, NetworkModule, ResponseOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    init_tracing(config.log_format)?;
    config.validate()?;

    tracing::info!(
        api = %config.api.name,
        version = %config.api.version(),
        strict_validation = config.strict_validation,
        "Starting keel-server"
    );

    if let Some(port) = config.metrics_port {
        init_metrics(&config.network.host, port)?;
    }

    let validator = register_rule_sets(RequestValidator::builder())
        .strict(config.strict_validation)
        .build();
    let orchestrator = Arc::new(ResponseOrchestrator::new(Arc::new(validator)));
    let token_reader = Arc::new(JwtTokenReader::new(&config.security));

    let mut module = NetworkModule::new(
        config.network.to_network_config()?,
        config.api.clone(),
        orchestrator,
        token_reader,
    );
    let port = module.start().await?;
    tracing::info!("Listening on {}:{port}", config.network.host);

    module.serve(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}
