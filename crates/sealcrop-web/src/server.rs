//! Server startup and graceful shutdown

use anyhow::Result;

use crate::config::Config;
use crate::router;
use crate::state::AppState;

/// Bind, serve until Ctrl+C or SIGTERM, then return.
pub async fn start_server(config: &Config) -> Result<()> {
    let state = AppState::shared(config.export_options());
    let app = router(state, config.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        output_dir = %config.output_dir.display(),
        jpeg_quality = config.jpeg_quality,
        bundle = config.bundle,
        max_upload_mb = config.max_upload_mb,
        "Server ready, open http://{} in a browser",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
