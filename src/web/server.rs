use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::flights as flight_handlers;
use super::api::ingest as ingest_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::status_board))
        .route("/tracks", get(ui_handlers::tracks))
        // JSON API
        .route("/api/status", get(flight_handlers::list_statuses))
        .route("/api/flights", get(flight_handlers::list_tracks))
        .route("/api/ingest/status", get(ingest_handlers::status))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
