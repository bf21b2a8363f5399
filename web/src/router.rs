use crate::sse::handler::sse_handler;
use axum::{routing::get, Router};
use service::AppState;

/// Builds the application router. Only `GET /sse` is routed; every other
/// path falls through to axum's default 404.
pub fn define_routes(app_state: AppState) -> Router {
    Router::new().merge(sse_routes(app_state))
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(sse_handler))
        .with_state(app_state)
}
