use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::Value;
use tracing::info;

use common::types::MessageBody;
use service::settings::SettingsMap;

use crate::errors::ApiError;
use crate::state::ServerState;

#[utoipa::path(get, path = "/data", tag = "settings", responses((status = 200, description = "Every setting as one JSON object"), (status = 500, description = "Store failure")))]
pub async fn get_data(State(state): State<ServerState>) -> Result<Json<SettingsMap>, ApiError> {
    let cancel = state.request_token();
    let all = state
        .settings
        .get_all(&cancel)
        .await
        .map_err(|e| ApiError::settings("Failed to fetch settings", &e))?;
    Ok(Json(all))
}

/// Each top-level field of the body replaces the setting of the same key.
#[utoipa::path(post, path = "/data", tag = "settings", request_body = Object, responses((status = 200, description = "Updated"), (status = 400, description = "Body is not an object or a key is invalid"), (status = 500, description = "Some keys failed")))]
pub async fn update_data(
    State(state): State<ServerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(body) = payload?;
    let Value::Object(fields) = body else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };
    let entries: SettingsMap = fields.into_iter().collect();
    let count = entries.len();
    let cancel = state.request_token();
    state.settings.bulk_upsert(entries, &cancel).await?;
    info!(keys = count, "data updated");
    Ok(Json(MessageBody::new("Data updated successfully")))
}
