//! HTTP endpoint that turns text and a PowerPoint template into a new deck.

pub mod config;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod pipeline;

use actix_web::web;
use slidegen_llm::OutlineSource;
use std::sync::Arc;

pub use config::AppConfig;
pub use errors::ApiError;

/// Shared, read-only state for every request.
pub struct AppState {
    pub config: AppConfig,
    pub outlines: Arc<dyn OutlineSource>,
}

impl AppState {
    pub fn new(config: AppConfig, outlines: Arc<dyn OutlineSource>) -> Self {
        Self { config, outlines }
    }
}

/// Register the routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/api/health", web::get().to(handlers::health))
        .route("/api/generate", web::post().to(handlers::generate));
}
