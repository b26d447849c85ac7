//! Patient directory: registration and lookup.

use anyhow::anyhow;
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

use crate::models::{Patient, RegisterPatient};

/// Resolves patient identifiers to display records.
///
/// The billing form queries this to prefill bill metadata; the ledger never
/// talks to patient storage directly.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn register(&self, input: RegisterPatient) -> Result<Patient, AppError>;

    /// Look up by patient id or MRN. The lookup box on the billing form is
    /// free text, and MRN is the identifier humans actually have.
    async fn lookup(&self, key: &str) -> Result<Patient, AppError>;

    /// Registered patients, newest first.
    async fn list(&self) -> Vec<Patient>;
}

/// Session-scoped in-memory directory.
pub struct InMemoryDirectory {
    patients: RwLock<Vec<Patient>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            patients: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PatientDirectory for InMemoryDirectory {
    async fn register(&self, input: RegisterPatient) -> Result<Patient, AppError> {
        let mut patients = self.patients.write().await;

        if patients
            .iter()
            .any(|p| p.mrn.eq_ignore_ascii_case(&input.mrn))
        {
            return Err(AppError::Conflict(anyhow!(
                "A patient with MRN {} already exists",
                input.mrn
            )));
        }

        let patient = Patient::new(input);
        patients.insert(0, patient.clone());
        Ok(patient)
    }

    async fn lookup(&self, key: &str) -> Result<Patient, AppError> {
        let key = key.trim();
        let patients = self.patients.read().await;
        patients
            .iter()
            .find(|p| p.patient_id.to_string() == key || p.mrn.eq_ignore_ascii_case(key))
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Patient not found")))
    }

    async fn list(&self) -> Vec<Patient> {
        self.patients.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, mrn: &str) -> RegisterPatient {
        RegisterPatient {
            mrn: mrn.to_string(),
            name: name.to_string(),
            age: 40,
            gender: "Male".to_string(),
            phone: None,
            department: "General".to_string(),
            diagnosis: None,
            doctor: None,
        }
    }

    #[tokio::test]
    async fn lookup_matches_id_and_mrn() {
        let directory = InMemoryDirectory::new();
        let patient = directory
            .register(input("Amit Shah", "HOS-0001"))
            .await
            .unwrap();

        let by_id = directory
            .lookup(&patient.patient_id.to_string())
            .await
            .unwrap();
        assert_eq!(by_id.mrn, "HOS-0001");

        let by_mrn = directory.lookup("hos-0001").await.unwrap();
        assert_eq!(by_mrn.patient_id, patient.patient_id);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let directory = InMemoryDirectory::new();
        assert!(matches!(
            directory.lookup("HOS-9999").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn duplicate_mrn_conflicts_and_listing_is_newest_first() {
        let directory = InMemoryDirectory::new();
        directory
            .register(input("Amit Shah", "HOS-0001"))
            .await
            .unwrap();
        directory
            .register(input("Neha Verma", "HOS-0002"))
            .await
            .unwrap();

        let err = directory
            .register(input("Imposter", "hos-0001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let listed = directory.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Neha Verma");
    }
}
