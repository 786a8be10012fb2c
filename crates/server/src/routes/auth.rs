use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::{json, Value};

use service::auth::domain::LoginInput;

use crate::errors::ApiError;
use crate::state::ServerState;

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in"), (status = 400, description = "Missing fields"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, payload: Result<Json<LoginInput>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload?;
    let user = state.auth.login(input).await?;
    Ok(Json(json!({ "message": "Login successful", "user": user })))
}
