use axum::{extract::{Multipart, State}, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

/// Multipart field carrying the image.
pub const FIELD_NAME: &str = "projectImage";
const FILE_PREFIX: &str = "project-image";

#[utoipa::path(post, path = "/upload-project-image", tag = "uploads", responses((status = 200, description = "Stored; body carries the public URL"), (status = 400, description = "No file uploaded")))]
pub async fn upload_project_image(State(state): State<ServerState>, mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }
        let original = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?;
        let stored = state.uploads.save(FILE_PREFIX, original.as_deref(), &bytes).await?;
        return Ok(Json(json!({ "url": stored.url })));
    }
    warn!(field = FIELD_NAME, "upload without file field");
    Err(ApiError::bad_request("No file uploaded"))
}
