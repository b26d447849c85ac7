//! Caller role context for the REST surface.
//!
//! The signed-in UI forwards the user's role in the `X-Role` header and the
//! service trusts it as-is. This is a placeholder mechanism for a demo
//! deployment, not a security boundary.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

use crate::models::Role;

pub const ROLE_HEADER: &str = "X-Role";

/// Role extracted from the `X-Role` header.
#[derive(Debug, Clone, Copy)]
pub struct RoleContext(pub Role);

#[async_trait]
impl<S> FromRequestParts<S> for RoleContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing X-Role header")))?;

        let role: Role = value
            .parse()
            .map_err(|e: String| AppError::Unauthorized(anyhow::anyhow!(e)))?;

        Ok(RoleContext(role))
    }
}
