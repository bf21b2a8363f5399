use log::*;
use service::{config::Config, AppState};
use ::sse::Manager;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod error;
pub mod router;
pub(crate) mod sse;

/// Binds the listening socket for the configured `interface:port`.
pub async fn bind(config: &Config) -> std::io::Result<TcpListener> {
    TcpListener::bind(config.listen_addr()).await
}

/// Serves the router on `listener` until Ctrl-C, SIGTERM or
/// `Manager::shutdown` is called, then drains open connections.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    let sse_manager = Arc::clone(&app_state.sse_manager);

    match app_state.sse_manager.max_connections() {
        Some(max) => info!("Accepting at most {max} concurrent SSE connections"),
        None => debug!("No limit on concurrent SSE connections"),
    }

    let router = router::define_routes(app_state);

    info!("SSE server listening on {addr}");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(sse_manager))
    .await?;

    info!("SSE server shut down");
    Ok(())
}

/// Waits for a termination request, then ends every open tick stream so the
/// graceful drain can complete.
async fn shutdown_signal(sse_manager: Arc<Manager>) {
    let requested = sse_manager.shutdown_signal();

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {e}");
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
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
        _ = requested.cancelled() => {}
    }

    if !sse_manager.is_shutting_down() {
        sse_manager.shutdown();
    }
}
