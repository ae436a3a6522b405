//! HTTP surface: `GET /`, `POST /process`, `POST /generate`.

pub mod error;
pub mod handlers;

pub use error::ApiResult;

use crate::config::ImageConfig;
use crate::core::cargo_image::CargoImageService;
use crate::core::enrichment::EnrichmentService;
use crate::core::pipeline::ProcessPipeline;
use crate::domain::ports::{FileFetcher, ImageGenerator, TextGenerator};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Read-only services shared by all handlers. Nothing here changes after
/// startup, so requests never contend.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ProcessPipeline,
    pub images: CargoImageService,
}

impl AppState {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        fetcher: Arc<dyn FileFetcher>,
        image_config: &ImageConfig,
    ) -> Self {
        Self {
            pipeline: ProcessPipeline::new(fetcher, EnrichmentService::new(text)),
            images: CargoImageService::new(
                image,
                image_config.max_prompt_chars,
                image_config.render_schematic,
            ),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::hello))
        .route("/process", post(handlers::process_file))
        .route("/generate", post(handlers::generate_image))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
