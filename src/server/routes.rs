use crate::inference::adapter::Classification;
use crate::inference::source::ImageSource;
use crate::server::error::ApiError;
use crate::server::upload::{read_field, secure_filename};
use crate::server::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static CAPTURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    /// URL of the stored image.
    pub filename: String,
    pub prediction: String,
    /// Percent, 0 to 100.
    pub confidence: f32,
}

impl PredictResponse {
    fn new(filename: &str, classification: &Classification) -> Self {
        Self {
            success: true,
            filename: format!("/uploads/{}", filename),
            prediction: classification.label.clone(),
            confidence: classification.confidence_percent(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub labels: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.adapter.is_available(),
        labels: state.adapter.labels().len(),
    })
}

/// Stores an uploaded file and classifies the bytes that were received.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let upload = read_field(multipart, "file")
        .await?
        .ok_or_else(|| ApiError::bad_request("no image file"))?;

    if upload.filename.is_empty() {
        return Err(ApiError::bad_request("empty file name"));
    }
    let filename = secure_filename(&upload.filename)
        .ok_or_else(|| ApiError::bad_request("invalid file name"))?;
    if !state.config.is_allowed_extension(&filename) {
        return Err(ApiError::bad_request("unsupported image format"));
    }

    let path = state.config.upload_dir.join(&filename);
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    // The stored copy can be replaced by a later upload with the same name.
    let adapter = state.adapter.clone();
    let data = upload.data.clone();
    let classification =
        tokio::task::spawn_blocking(move || adapter.classify(&ImageSource::Bytes(&data[..])))
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .inspect_err(|e| {
                let _ = state.logger.error(&format!("POST /predict {}: {}", filename, e));
            })?;

    let _ = state.logger.info(&format!(
        "POST /predict {} -> {}",
        filename, classification.label
    ));

    Ok(Json(PredictResponse::new(&filename, &classification)))
}

/// Classifies a captured camera frame, then keeps a JPEG copy of it.
pub async fn camera_predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let upload = read_field(multipart, "image")
        .await?
        .ok_or_else(|| ApiError::bad_request("no camera data"))?;

    let adapter = state.adapter.clone();
    let upload_dir = state.config.upload_dir.clone();

    let (filename, classification) =
        tokio::task::spawn_blocking(move || -> Result<(String, Classification), ApiError> {
            let frame = image::load_from_memory(&upload.data)
                .map_err(|_| ApiError::bad_request("failed to decode image"))?;

            let classification = adapter.classify(&ImageSource::Pixels(&frame))?;

            let filename = format!(
                "camera_{}_{}.jpg",
                Utc::now().timestamp_millis(),
                CAPTURES.fetch_add(1, Ordering::Relaxed)
            );
            std::fs::create_dir_all(&upload_dir).map_err(|e| ApiError::internal(e.to_string()))?;
            frame
                .to_rgb8()
                .save_with_format(upload_dir.join(&filename), ImageFormat::Jpeg)
                .map_err(|e| ApiError::internal(e.to_string()))?;

            Ok((filename, classification))
        })
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .inspect_err(|e| {
            let _ = state
                .logger
                .error(&format!("POST /camera_predict: {}", e.message));
        })?;

    let _ = state.logger.info(&format!(
        "POST /camera_predict {} -> {}",
        filename, classification.label
    ));

    Ok(Json(PredictResponse::new(&filename, &classification)))
}
