//! The draft session surface: the billing form's edit operations over the
//! ledger-owned draft. Row editing is ungated; committing is where the
//! billing role policy bites.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::bills::{BillResponse, DraftView, LineItemPatchRequest, SetMetaRequest};
use crate::middleware::RoleContext;
use crate::services::metrics::observe_bill;
use crate::services::BillingLedger;
use crate::startup::AppState;

fn view(ledger: &BillingLedger) -> DraftView {
    DraftView::new(ledger.draft(), ledger.totals())
}

/// Draft plus live totals, recomputed on every read.
#[axum::debug_handler]
pub async fn get_draft(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(view(&ledger))
}

#[axum::debug_handler]
pub async fn set_draft_meta(
    State(state): State<AppState>,
    Json(req): Json<SetMetaRequest>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    ledger.set_meta(req.field, &req.value);
    Json(view(&ledger))
}

#[axum::debug_handler]
pub async fn add_draft_item(State(state): State<AppState>) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    ledger.add_line_item();
    Json(view(&ledger))
}

#[axum::debug_handler]
pub async fn update_draft_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<LineItemPatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut ledger = state.ledger.write().await;
    ledger.update_line_item(index, req.into())?;
    Ok(Json(view(&ledger)))
}

#[axum::debug_handler]
pub async fn remove_draft_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let mut ledger = state.ledger.write().await;
    ledger.remove_line_item(index)?;
    Ok(Json(view(&ledger)))
}

#[axum::debug_handler]
pub async fn commit_draft(
    State(state): State<AppState>,
    RoleContext(role): RoleContext,
) -> Result<impl IntoResponse, AppError> {
    let bill = state.ledger.write().await.commit_draft(role)?;
    observe_bill("draft", bill.total);

    tracing::info!(
        bill_id = %bill.bill_id,
        patient_id = %bill.meta.patient_id,
        total = %bill.total,
        "Draft committed"
    );

    Ok((StatusCode::CREATED, Json(BillResponse::from(&bill))))
}
