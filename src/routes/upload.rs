//! HTTP routes for image upload and serving
//!
//! - POST /upload             - store an uploaded image (bearer)
//! - GET  /uploads/{filename} - serve a stored image

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::auth::resolve_actor;
use crate::error::ApiError;
use crate::server::SharedState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /upload
///
/// Expects a multipart form with an `image` part. Returns the public URL of
/// the stored file; attaching it to a work or profile happens through the
/// normal update endpoints.
pub async fn upload_image(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;

    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::Validation("missing filename".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("failed to read upload: {e}")))?;

        image = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) =
        image.ok_or_else(|| ApiError::Validation("an image file is required".to_string()))?;

    let stored = state.images.save(&filename, &data).await?;
    let url = state.args.upload_url(&stored);

    info!(file = %stored, user = actor, "Image uploaded");

    Ok(Json(UploadResponse { url }))
}

/// GET /uploads/{filename}
pub async fn serve_image(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    match state.images.load(&filename).await? {
        Some((data, content_type)) => {
            Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
        }
        None => Err(ApiError::NotFound("file not found".to_string())),
    }
}
