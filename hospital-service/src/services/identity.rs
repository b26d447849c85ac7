//! Identity gate: who is signing in, and as what role.

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::models::Role;

/// One entry in the demo credential table.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// A signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

/// Authentication seam. Everything downstream depends only on the
/// resulting `Role`, never on how credentials are stored or checked.
#[async_trait]
pub trait IdentityGate: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AppError>;
}

/// Gate over a static credential table from configuration.
///
/// Plain string comparison against a configured table: a demo stand-in,
/// not a security boundary.
pub struct StaticCredentialGate {
    users: Vec<Credential>,
}

impl StaticCredentialGate {
    pub fn new(users: Vec<Credential>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityGate for StaticCredentialGate {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()) && u.password == password)
            .map(|u| Identity {
                email: u.email.clone(),
                role: u.role,
            })
            .ok_or_else(|| AppError::Unauthorized(anyhow!("Invalid credentials")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> StaticCredentialGate {
        StaticCredentialGate::new(vec![Credential {
            email: "manager@meditrack.com".to_string(),
            password: "manager123".to_string(),
            role: Role::Manager,
        }])
    }

    #[tokio::test]
    async fn valid_credentials_resolve_to_a_role() {
        let identity = gate()
            .authenticate("Manager@MediTrack.com", "manager123")
            .await
            .unwrap();
        assert_eq!(identity.role, Role::Manager);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let err = gate()
            .authenticate("manager@meditrack.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
