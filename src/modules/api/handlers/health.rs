use crate::modules::api::{filters::AuthUser, responder::respond_fields};
use crate::shared::errors::ErrorMessage;
use serde_json::json;
use warp::{http::StatusCode, reply::Response, Rejection};

pub const API_VERSION: &str = "1.0.0";

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Result<Response, Rejection> {
    respond_fields(
        json!({
            "message": "IndoWater API is running",
            "version": API_VERSION,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        StatusCode::OK,
    )
}

#[utoipa::path(
    get,
    path = "/api/test",
    responses(
        (status = 200, description = "Token accepted"),
        (status = 401, description = "Unauthenticated", body = ErrorMessage),
    )
)]
pub async fn test(auth: AuthUser) -> Result<Response, Rejection> {
    respond_fields(
        json!({ "message": "API is working", "user": auth.user }),
        StatusCode::OK,
    )
}
