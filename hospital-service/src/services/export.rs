//! CSV serialization for the export downloads.
//!
//! Every value is double-quote-wrapped with embedded quotes doubled, and an
//! empty record set serializes to an empty string rather than a lone header
//! or an error.

use crate::models::{Bill, Patient};

/// Columns of `bills.csv`: the flattened bill summary. The nested item
/// list and the internal bill id are not exported.
const BILL_COLUMNS: [&str; 9] = [
    "patient_id",
    "patient_name",
    "mrn",
    "doctor",
    "phone",
    "subtotal",
    "tax",
    "total",
    "created_at",
];

/// Columns of `patients.csv`: the registration fields, without the internal
/// id and creation timestamp.
const PATIENT_COLUMNS: [&str; 8] = [
    "name",
    "age",
    "gender",
    "phone",
    "mrn",
    "department",
    "diagnosis",
    "doctor",
];

fn escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn row<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| escape(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn bills_to_csv(bills: &[Bill]) -> String {
    if bills.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(bills.len() + 1);
    lines.push(row(BILL_COLUMNS));
    for bill in bills {
        lines.push(row([
            bill.meta.patient_id.clone(),
            opt(&bill.meta.patient_name),
            opt(&bill.meta.mrn),
            opt(&bill.meta.doctor),
            opt(&bill.meta.phone),
            bill.subtotal.to_string(),
            bill.tax.to_string(),
            bill.total.to_string(),
            bill.created_at.to_rfc3339(),
        ]));
    }
    lines.join("\n")
}

pub fn patients_to_csv(patients: &[Patient]) -> String {
    if patients.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(patients.len() + 1);
    lines.push(row(PATIENT_COLUMNS));
    for patient in patients {
        lines.push(row([
            patient.name.clone(),
            patient.age.to_string(),
            patient.gender.clone(),
            opt(&patient.phone),
            patient.mrn.clone(),
            patient.department.clone(),
            opt(&patient.diagnosis),
            opt(&patient.doctor),
        ]));
    }
    lines.join("\n")
}
