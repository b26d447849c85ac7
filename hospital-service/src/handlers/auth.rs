use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::auth::{LoginRequest, LoginResponse};
use crate::startup::AppState;

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let identity = state
        .identity
        .authenticate(&req.email, &req.password)
        .await?;

    tracing::info!(email = %identity.email, role = %identity.role, "User signed in");

    Ok(Json(LoginResponse {
        email: identity.email,
        role: identity.role,
    }))
}
