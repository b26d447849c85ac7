//! Patient registration DTOs.

use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::models::RegisterPatient;

fn default_gender() -> String {
    "Male".to_string()
}

fn default_department() -> String {
    "General".to_string()
}

fn lenient_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let age = super::coerce_quantity(&value);
    Ok(age.min(u32::MAX as i64) as u32)
}

/// `POST /patients` request body. Gender and department fall back to the
/// registration form's defaults; age tolerates the form posting a string.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPatientRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: u32,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "MRN is required"))]
    pub mrn: String,
    #[serde(default = "default_department")]
    pub department: String,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub doctor: Option<String>,
}

impl From<RegisterPatientRequest> for RegisterPatient {
    fn from(req: RegisterPatientRequest) -> Self {
        Self {
            mrn: req.mrn.trim().to_string(),
            name: req.name.trim().to_string(),
            age: req.age,
            gender: req.gender,
            phone: req.phone.filter(|p| !p.trim().is_empty()),
            department: req.department,
            diagnosis: req.diagnosis.filter(|d| !d.trim().is_empty()),
            doctor: req.doctor.filter(|d| !d.trim().is_empty()),
        }
    }
}
