use provisioning_api::config::{ApiConfig, DEFAULT_LOG_FILTER};
use provisioning_api::{app, logging, AppState};
use rmq_provisioner::Provisioner;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    logging::init_logging(DEFAULT_LOG_FILTER);

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    info!(
        listen_addr = %config.listen_addr,
        management_url = %config.broker.management_url,
        admin_user = %config.broker.admin.username,
        configure_policy = ?config.broker.configure_policy,
        max_attempts = config.broker.retry_policy.max_attempts,
        "Starting RabbitMQ provisioning service"
    );

    let provisioner = Provisioner::from_config(&config.broker).unwrap_or_else(|e| {
        eprintln!("Failed to build management API client: {e}");
        std::process::exit(1);
    });

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {e}", config.listen_addr);
            std::process::exit(1);
        }
    };

    info!(addr = %config.listen_addr, "Server listening");

    if let Err(e) = axum::serve(listener, app(AppState::new(provisioner)))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
