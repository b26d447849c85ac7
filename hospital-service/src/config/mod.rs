//! Environment-driven configuration for hospital-service.

use anyhow::anyhow;
use rust_decimal::Decimal;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::models::Role;
use crate::services::Credential;

/// Demo credential table, mirroring the sign-in form's defaults.
const DEFAULT_USERS: &str = "manager@meditrack.com:manager123:Manager,\
doctor@meditrack.com:doctor123:Doctor,\
staff@meditrack.com:staff123:Staff";

#[derive(Debug, Clone)]
pub struct HospitalConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub billing: BillingSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone)]
pub struct BillingSettings {
    /// Tax rate applied to every bill subtotal.
    pub tax_rate: Decimal,
    /// Roles allowed to commit bills: the clinical billing policy
    /// (Manager, Doctor) unless overridden.
    pub authorized_roles: Vec<Role>,
    /// When set, bill creation is proxied to this upstream billing service
    /// and the returned record imported verbatim.
    pub upstream_url: Option<String>,
    /// Hard timeout for calls to the upstream billing service.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub users: Vec<Credential>,
}

impl HospitalConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let tax_rate = get_env("BILLING_TAX_RATE", Some("0.12"), is_prod)?
            .parse::<Decimal>()
            .map_err(|e| AppError::ConfigError(anyhow!("Invalid BILLING_TAX_RATE: {}", e)))?;

        let authorized_roles =
            parse_roles(&get_env("BILLING_AUTHORIZED_ROLES", Some("Manager,Doctor"), is_prod)?)?;

        let request_timeout_secs = get_env("BILLING_REQUEST_TIMEOUT_SECS", Some("10"), is_prod)?
            .parse::<u64>()
            .map_err(|e| {
                AppError::ConfigError(anyhow!("Invalid BILLING_REQUEST_TIMEOUT_SECS: {}", e))
            })?;

        Ok(Self {
            common,
            service_name: get_env("SERVICE_NAME", Some("hospital-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            billing: BillingSettings {
                tax_rate,
                authorized_roles,
                upstream_url: env::var("BILLING_UPSTREAM_URL")
                    .ok()
                    .map(|url| url.trim_end_matches('/').to_string())
                    .filter(|url| !url.is_empty()),
                request_timeout_secs,
            },
            auth: AuthSettings {
                users: parse_users(&get_env("AUTH_USERS", Some(DEFAULT_USERS), is_prod)?)?,
            },
        })
    }
}

fn parse_roles(value: &str) -> Result<Vec<Role>, AppError> {
    let roles: Result<Vec<Role>, String> = value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect();
    let roles = roles.map_err(|e| AppError::ConfigError(anyhow!(e)))?;
    if roles.is_empty() {
        return Err(AppError::ConfigError(anyhow!(
            "BILLING_AUTHORIZED_ROLES must name at least one role"
        )));
    }
    Ok(roles)
}

/// Parse `email:password:Role` triples separated by commas.
fn parse_users(value: &str) -> Result<Vec<Credential>, AppError> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|entry| {
            let mut parts = entry.trim().splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(password), Some(role)) => Ok(Credential {
                    email: email.trim().to_string(),
                    password: password.to_string(),
                    role: role
                        .parse()
                        .map_err(|e: String| AppError::ConfigError(anyhow!(e)))?,
                }),
                _ => Err(AppError::ConfigError(anyhow!(
                    "AUTH_USERS entries must look like email:password:Role"
                ))),
            }
        })
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
