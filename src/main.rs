use log::*;
use service::{config::Config, logging::Logger, AppState};
use sse::Manager;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!(
        "Starting SSE clock, one event every {:?}",
        config.tick_interval()
    );

    let sse_manager = Arc::new(Manager::new(
        config.tick_interval(),
        config.max_connections,
    ));

    let listener = match web::bind(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            Logger::fatal(&format!(
                "Failed to start server on {}: {e}",
                config.listen_addr()
            ));
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(&sse_manager);

    if let Err(e) = web::serve(listener, app_state).await {
        Logger::fatal(&format!("Server error: {e}"));
        std::process::exit(1);
    }
}
