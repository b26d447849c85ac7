//! HTTP client for a remote billing collaborator.

use std::time::Duration;

use anyhow::anyhow;
use reqwest::Client;
use service_core::error::AppError;

use crate::dtos::bills::{CreateBillRequest, ExternalBillRecord};
use crate::middleware::role::ROLE_HEADER;
use crate::models::Role;

/// Client for an upstream billing service speaking the same `/bills`
/// surface. Calls carry the caller's role header and a hard timeout, and
/// are never retried: a silent retry could double-bill a patient.
pub struct BillingClient {
    client: Client,
    base_url: String,
}

impl BillingClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalError(anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /bills` on the collaborator.
    pub async fn create_bill(
        &self,
        role: Role,
        request: &CreateBillRequest,
    ) -> Result<ExternalBillRecord, AppError> {
        let url = format!("{}/bills", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(ROLE_HEADER, role.as_str())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Billing request failed to send");
                if e.is_timeout() {
                    AppError::RemoteBilling("Billing request timed out".to_string())
                } else {
                    AppError::RemoteBilling(format!("Failed to reach billing service: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            // Collaborator errors are `{"detail": ...}` when present.
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("detail")?.as_str().map(String::from))
                .unwrap_or_else(|| "Failed to create bill".to_string());
            tracing::warn!(url = %url, status = %status, detail = %detail, "Billing request rejected");
            return Err(AppError::RemoteBilling(detail));
        }

        response.json::<ExternalBillRecord>().await.map_err(|e| {
            AppError::Schema(anyhow!(
                "Unexpected bill payload from billing service: {}",
                e
            ))
        })
    }
}
