//! Axum router configuration with middleware.
//!
//! All API routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! In production, the built SPA is served from the configured web dist
//! directory. API routes take priority; unknown paths fall through to the
//! SPA's `index.html` for client-side routing. If the directory does not
//! exist, only the API is served.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_dir = state.config.server.web_dir.clone();

    let api_routes = Router::new()
        // The chat relay
        .route("/chat", post(handlers::chat::relay_chat))
        // Template catalog
        .route("/templates", get(handlers::template::list_templates))
        .route("/templates/{id}", get(handlers::template::get_template))
        // Custom mentors
        .route("/mentors", post(handlers::mentor::create_mentor))
        .route("/mentors", get(handlers::mentor::list_mentors))
        .route("/mentors/{id}", get(handlers::mentor::get_mentor))
        // Sessions
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route("/sessions/{id}", delete(handlers::session::delete_session))
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_messages),
        )
        // Billing
        .route("/billing/checkout", post(handlers::billing::create_checkout))
        .route("/billing/portal", post(handlers::billing::create_portal))
        .route(
            "/billing/subscription/{user_id}",
            get(handlers::billing::subscription_status),
        )
        .route("/billing/webhook", post(handlers::webhook::receive_webhook));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the built SPA from disk if the directory exists. API routes and
    // /health take priority; unknown paths fall through to index.html for
    // client-side routing.
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "SPA static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
