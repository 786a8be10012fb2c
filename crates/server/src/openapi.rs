use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::settings::get_data,
        crate::routes::settings::update_data,
        crate::routes::auth::login,
        crate::routes::uploads::upload_project_image,
    ),
    components(schemas(HealthResponse, LoginRequest)),
    tags(
        (name = "health"),
        (name = "settings"),
        (name = "auth"),
        (name = "uploads")
    )
)]
pub struct ApiDoc;
