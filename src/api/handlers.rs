//! HTTP handlers for the gallery endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::{AppError, Result};
use crate::store::GenerationRecord;
use crate::AppState;

/// Body of `POST /generate-image`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateImageBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful generation response
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub url: String,
}

/// Log a failure once, at the endpoint boundary
fn log_failure(operation: &str, err: &AppError) {
    if err.status_code().is_client_error() {
        warn!(operation, error = %err, "Request rejected");
    } else {
        error!(operation, error = %err, "Request failed");
    }
}

/// `POST /generate-image`
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<GenerateImageBody>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>> {
    let result = match payload {
        Ok(Json(body)) => state.gallery.generate(body.prompt.as_deref()).await,
        Err(rejection) => Err(AppError::Validation(rejection.body_text())),
    };

    result
        .map(|url| Json(GenerateImageResponse { url }))
        .map_err(|err| {
            log_failure("generate_image", &err);
            err
        })
}

/// `GET /generate-image`
pub async fn list_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GenerationRecord>>> {
    state.gallery.list().await.map(Json).map_err(|err| {
        log_failure("list_images", &err);
        err
    })
}

/// `GET /`
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_page.clone())
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
