pub mod api;
pub mod authorization;
pub mod config;
pub mod core_state;
pub mod credentials;
pub mod db;
pub mod directory;
pub mod models;
pub mod scheduling;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Process entry point: tracing, configuration, database, HTTP server.
/// Runs until Ctrl-C, then drains in-flight requests and flushes the audit log.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    let bind_addr = config.bind_addr;
    let core = Arc::new(core_state::CoreState::new(config));
    core.initialize_database()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server = api::start_api_server(core, bind_addr).await?;
        tracing::info!(addr = %server.session.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
        }
        server.stop().await;
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
