use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::patients::RegisterPatientRequest;
use crate::middleware::RoleContext;
use crate::models::RegisterPatient;
use crate::services::export;
use crate::services::metrics::PATIENTS_REGISTERED_TOTAL;
use crate::startup::AppState;

/// Any signed-in role may register patients; only billing is gated to the
/// billing roles.
#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<AppState>,
    RoleContext(role): RoleContext,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let patient = state
        .directory
        .register(RegisterPatient::from(req))
        .await?;
    PATIENTS_REGISTERED_TOTAL.inc();

    tracing::info!(
        patient_id = %patient.patient_id,
        mrn = %patient.mrn,
        role = %role,
        "Patient registered"
    );

    Ok((StatusCode::CREATED, Json(patient)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    RoleContext(_role): RoleContext,
) -> impl IntoResponse {
    Json(state.directory.list().await)
}

/// Lookup by patient id or MRN. Left open: the billing form's autofill
/// fires before any role context is attached.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let patient = state.directory.lookup(&key).await?;
    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn export_patients(
    State(state): State<AppState>,
    RoleContext(_role): RoleContext,
) -> impl IntoResponse {
    let csv = export::patients_to_csv(&state.directory.list().await);
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"patients.csv\"",
            ),
        ],
        csv,
    )
}
