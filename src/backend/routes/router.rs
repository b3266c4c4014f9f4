/**
 * Router Configuration
 *
 * Combines the API routes, the WebSocket endpoint, CORS and (in production)
 * the built frontend into a single Axum router.
 *
 * # Route Order
 *
 * 1. API routes
 * 2. `GET /ws`
 * 3. Static files with SPA fallback (production only)
 * 4. JSON 404 fallback
 */

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::backend::socket::ws_upgrade;
use crate::shared::AppConfig;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/ws", get(ws_upgrade));
    let router = configure_api_routes(router, &app_state);

    let router = if app_state.config.environment.is_production() {
        let static_dir = &app_state.config.static_dir;
        tracing::info!(dir = %static_dir.display(), "Serving frontend from static directory");
        let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
        router.fallback_service(spa)
    } else {
        router.fallback(|| async { BackendError::not_found("Not Found") })
    };

    router.layer(cors_layer(&app_state.config)).with_state(app_state)
}

/// CORS for the configured client origins, with credentials
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
