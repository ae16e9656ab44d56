// Route exports
pub mod auth;
pub mod discover;
pub mod error;
pub mod swipe;

use actix_web::{web, HttpResponse, Responder};

use crate::core::{DiscoveryPlanner, SwipeOrchestrator};
use crate::models::HealthResponse;

pub use auth::{AuthenticatedUser, Claims, TokenVerifier};
pub use error::{handle_json_payload_error, handle_query_payload_error, ApiError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub swipes: SwipeOrchestrator,
    pub discovery: DiscoveryPlanner,
    pub tokens: TokenVerifier,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health_check))
                .route("/swipe", web::post().to(swipe::swipe))
                .route("/discover", web::get().to(discover::discover)),
        );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
