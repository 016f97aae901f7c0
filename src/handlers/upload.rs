//! Cover image upload route.
//!
//! Accepts `multipart/form-data` with the file in the `image` field. The
//! body size cap is applied by the router.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use super::{ApiError, AppState};

/// Form field carrying the file.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        let stored = state.images.save(&file_name, &data).await?;

        return Ok(Json(UploadResponse { url: stored.url }));
    }

    Err(ApiError::BadRequest(format!(
        "missing '{}' file field",
        IMAGE_FIELD
    )))
}
