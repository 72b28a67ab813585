use axum::{http::StatusCode, response::IntoResponse};

use super::error_responses::{AppError, ok};

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, ok("OK"))
}

pub async fn not_found() -> impl IntoResponse {
    AppError::not_found("Route not found")
}
