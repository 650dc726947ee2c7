//! Router assembly and server entry point

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::AppState;

/// Assemble the router with request tracing and permissive CORS.
/// The dashboard frontend is served from a different origin.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve the session API on the host and port from the application config
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let config = state.config().await;
    let addr = format!("{}:{}", config.api_host, config.api_port);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Session API listening");

    axum::serve(listener, app).await
}
