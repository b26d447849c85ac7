//! Patient records for the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: Uuid,
    pub mrn: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: Option<String>,
    pub department: String,
    pub diagnosis: Option<String>,
    pub doctor: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a patient.
#[derive(Debug, Clone)]
pub struct RegisterPatient {
    pub mrn: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: Option<String>,
    pub department: String,
    pub diagnosis: Option<String>,
    pub doctor: Option<String>,
}

impl Patient {
    pub fn new(input: RegisterPatient) -> Self {
        Self {
            patient_id: Uuid::new_v4(),
            mrn: input.mrn,
            name: input.name,
            age: input.age,
            gender: input.gender,
            phone: input.phone,
            department: input.department,
            diagnosis: input.diagnosis,
            doctor: input.doctor,
            created_at: Utc::now(),
        }
    }
}
