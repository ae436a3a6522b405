use crate::api::{ApiResult, AppState};
use crate::domain::model::{CargoImages, ProductRecord};
use crate::utils::error::AppError;
use crate::utils::validation::validate_url;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

const FILE_URL_SCHEMES: &[&str] = &["http", "https", "s3"];

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub products: Vec<ProductRecord>,
    #[serde(rename = "includeSchematic", default)]
    pub include_schematic: Option<bool>,
}

/// GET /
pub async fn hello() -> &'static str {
    "Hello, World!"
}

/// POST /process
///
/// Downloads the spreadsheet at `fileUrl` and enriches every product row.
pub async fn process_file(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<ProductRecord>>> {
    let Json(request) = payload.inspect_err(|e| tracing::warn!("Rejected /process body: {}", e))?;
    validate_url("fileUrl", &request.file_url, FILE_URL_SCHEMES).map_err(|e| {
        AppError::ValidationError {
            message: e.to_string(),
        }
    })?;

    let records = state
        .pipeline
        .run(request.file_url.trim())
        .await
        .inspect_err(|e| tracing::error!("Error in process_file: {}", e))?;

    Ok(Json(records))
}

/// POST /generate
///
/// Renders the cargo-hold image for the posted products.
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<CargoImages>> {
    let Json(request) = payload.inspect_err(|e| tracing::warn!("Rejected /generate body: {}", e))?;
    tracing::info!("Generating cargo image for {} products", request.products.len());

    let images = state
        .images
        .generate(&request.products, request.include_schematic)
        .await
        .inspect_err(|e| tracing::error!("Error in generate_image: {}", e))?;

    Ok(Json(images))
}
