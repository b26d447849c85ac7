//! Test helper module for hospital-service integration tests.

#![allow(dead_code)]

use hospital_service::config::{AuthSettings, BillingSettings, HospitalConfig};
use hospital_service::models::Role;
use hospital_service::services::Credential;
use hospital_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;

/// Configuration for a self-contained test instance: random port, local
/// ledger, the demo credential table and the clinical billing policy.
pub fn test_config() -> HospitalConfig {
    HospitalConfig {
        common: CoreConfig { port: 0 },
        service_name: "hospital-service-test".to_string(),
        log_level: "warn".to_string(),
        billing: BillingSettings {
            tax_rate: "0.12".parse().unwrap(),
            authorized_roles: vec![Role::Manager, Role::Doctor],
            upstream_url: None,
            request_timeout_secs: 2,
        },
        auth: AuthSettings {
            users: vec![
                Credential {
                    email: "manager@meditrack.com".to_string(),
                    password: "manager123".to_string(),
                    role: Role::Manager,
                },
                Credential {
                    email: "doctor@meditrack.com".to_string(),
                    password: "doctor123".to_string(),
                    role: Role::Doctor,
                },
                Credential {
                    email: "staff@meditrack.com".to_string(),
                    password: "staff123".to_string(),
                    role: Role::Staff,
                },
            ],
        },
    }
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a test application on a random port with the default config.
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    /// Spawn a test application with a custom configuration.
    pub async fn spawn_with(config: HospitalConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();

        // Wait for the server to be ready by polling the health endpoint.
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    /// Register a patient and return the response body.
    pub async fn register_patient(&self, name: &str, mrn: &str) -> Value {
        let response = self
            .client
            .post(format!("{}/patients", self.address))
            .header("X-Role", "Staff")
            .json(&json!({ "name": name, "mrn": mrn, "age": 40 }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse patient JSON")
    }

    /// `POST /bills` as the given role.
    pub async fn create_bill(&self, role: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/bills", self.address))
            .header("X-Role", role)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// `GET /bills` as the given role, parsed.
    pub async fn list_bills(&self, role: &str) -> Vec<Value> {
        self.client
            .get(format!("{}/bills", self.address))
            .header("X-Role", role)
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse bills JSON")
    }
}
