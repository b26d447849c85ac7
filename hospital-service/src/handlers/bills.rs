use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::bills::{BillResponse, CreateBillRequest};
use crate::middleware::RoleContext;
use crate::models::{Bill, BillDraft, BillMeta, LineItem, Role};
use crate::services::metrics::observe_bill;
use crate::services::{export, extract};
use crate::startup::AppState;

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Create one bill. With an upstream billing service configured the call
/// is proxied and the returned record imported verbatim; otherwise the
/// bill is committed locally. Either way the caller's draft/session state
/// is only touched after confirmed success.
#[axum::debug_handler]
pub async fn create_bill(
    State(state): State<AppState>,
    RoleContext(role): RoleContext,
    Json(req): Json<CreateBillRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_billing_role(&state, role).await?;

    let bill = match &state.billing_client {
        Some(client) => {
            let record = client.create_bill(role, &req).await?;
            let bill = record.into_bill()?;
            state.ledger.write().await.import_external(bill.clone());
            observe_bill("upstream", bill.total);
            tracing::info!(
                bill_id = %bill.bill_id,
                total = %bill.total,
                upstream = %client.base_url(),
                "Bill imported from upstream billing service"
            );
            bill
        }
        None => {
            let draft = draft_from_request(&state, &req).await?;
            let bill = state.ledger.write().await.commit_with(&draft, role)?;
            observe_bill("request", bill.total);
            tracing::info!(
                bill_id = %bill.bill_id,
                patient_id = %bill.meta.patient_id,
                total = %bill.total,
                "Bill created"
            );
            bill
        }
    };

    Ok((StatusCode::CREATED, Json(BillResponse::from(&bill))))
}

#[axum::debug_handler]
pub async fn list_bills(
    State(state): State<AppState>,
    RoleContext(_role): RoleContext,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let bills: Vec<BillResponse> = ledger.bills().iter().map(BillResponse::from).collect();
    Json(bills)
}

#[axum::debug_handler]
pub async fn export_bills(
    State(state): State<AppState>,
    RoleContext(_role): RoleContext,
) -> impl IntoResponse {
    let csv = {
        let ledger = state.ledger.read().await;
        export::bills_to_csv(ledger.bills())
    };
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bills.csv\"",
            ),
        ],
        csv,
    )
}

/// `POST /bills/upload-csv`: multipart `file` (+ optional `patient_id`).
#[axum::debug_handler]
pub async fn upload_bill_csv(
    State(state): State<AppState>,
    RoleContext(role): RoleContext,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    ensure_billing_role(&state, role).await?;

    let upload = read_upload(&mut multipart).await?;
    let items = extract::parse_items_csv(&upload.data)?;
    let bill = commit_uploaded_items(&state, role, upload.patient_id, items, "csv").await?;

    tracing::info!(
        bill_id = %bill.bill_id,
        file_name = %upload.file_name,
        total = %bill.total,
        "Bill created from CSV upload"
    );

    Ok((StatusCode::CREATED, Json(BillResponse::from(&bill))))
}

/// `POST /bills/upload-image`: multipart `file` (+ optional `patient_id`).
/// Answers 503 until an image reader collaborator is wired in.
#[axum::debug_handler]
pub async fn upload_bill_image(
    State(state): State<AppState>,
    RoleContext(role): RoleContext,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    ensure_billing_role(&state, role).await?;

    let reader = state.image_reader.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Image bill extraction is not configured".to_string())
    })?;

    let upload = read_upload(&mut multipart).await?;
    let items = reader.extract(&upload.data, &upload.content_type).await?;
    let bill = commit_uploaded_items(&state, role, upload.patient_id, items, "image").await?;

    tracing::info!(
        bill_id = %bill.bill_id,
        file_name = %upload.file_name,
        total = %bill.total,
        "Bill created from image upload"
    );

    Ok((StatusCode::CREATED, Json(BillResponse::from(&bill))))
}

async fn ensure_billing_role(state: &AppState, role: Role) -> Result<(), AppError> {
    let ledger = state.ledger.read().await;
    if !ledger.policy().authorizes(role) {
        return Err(AppError::PermissionDenied(anyhow!(
            "Role {} is not authorized to create bills",
            role
        )));
    }
    Ok(())
}

/// Resolve the patient for autofill and build the draft to commit.
/// Explicit request fields win over directory values.
async fn draft_from_request(
    state: &AppState,
    req: &CreateBillRequest,
) -> Result<BillDraft, AppError> {
    if req.patient_id.trim().is_empty() {
        return Err(AppError::Validation(anyhow!(
            "A patient identifier is required"
        )));
    }

    let patient = state.directory.lookup(&req.patient_id).await?;
    let meta = BillMeta {
        patient_id: patient.patient_id.to_string(),
        patient_name: req.patient_name.clone().or(Some(patient.name.clone())),
        mrn: req.mrn.clone().or(Some(patient.mrn.clone())),
        doctor: req.doctor.clone().or_else(|| patient.doctor.clone()),
        phone: req.patient_phone.clone().or_else(|| patient.phone.clone()),
    };

    Ok(BillDraft {
        meta,
        items: req.line_items(),
    })
}

struct BillUpload {
    data: Vec<u8>,
    content_type: String,
    file_name: String,
    patient_id: Option<String>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<BillUpload, AppError> {
    let mut file = None;
    let mut patient_id = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(anyhow!("Failed to read file bytes: {}", e)))?
                    .to_vec();

                if data.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(anyhow!("File too large (max 5MB)")));
                }

                file = Some((data, content_type, file_name));
            }
            Some("patient_id") => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow!("Failed to read patient_id field: {}", e))
                })?;
                patient_id = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let (data, content_type, file_name) =
        file.ok_or_else(|| AppError::BadRequest(anyhow!("No file uploaded")))?;

    Ok(BillUpload {
        data,
        content_type,
        file_name,
        patient_id,
    })
}

/// Commit extracted line items against the uploaded patient id.
async fn commit_uploaded_items(
    state: &AppState,
    role: Role,
    patient_id: Option<String>,
    items: Vec<LineItem>,
    source: &str,
) -> Result<Bill, AppError> {
    let key = patient_id.ok_or_else(|| {
        AppError::Validation(anyhow!("A patient identifier is required"))
    })?;
    let patient = state.directory.lookup(&key).await?;

    let draft = BillDraft {
        meta: BillMeta {
            patient_id: patient.patient_id.to_string(),
            patient_name: Some(patient.name.clone()),
            mrn: Some(patient.mrn.clone()),
            doctor: patient.doctor.clone(),
            phone: patient.phone.clone(),
        },
        items,
    };

    let bill = state.ledger.write().await.commit_with(&draft, role)?;
    observe_bill(source, bill.total);
    Ok(bill)
}
