use axum::{extract::DefaultBodyLimit, routing::{get, post}, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod auth;
pub mod settings;
pub mod uploads;

pub const BANNER: &str = "Portfolio backend is running";

pub async fn root() -> &'static str {
    BANNER
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router
pub fn build_router(state: ServerState, body_limit_bytes: usize) -> Router {
    let uploads_dir = ServeDir::new(state.uploads.dir());

    let api = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/data", get(settings::get_data).post(settings::update_data))
        .route("/login", post(auth::login))
        .route("/upload-project-image", post(uploads::upload_project_image))
        .nest_service("/uploads", uploads_dir)
        .with_state(state);

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
