//! Patient registration, lookup and export tests.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn registered_patients_resolve_by_id_and_mrn() {
    let app = TestApp::spawn().await;
    let patient = app.register_patient("Amit Shah", "HOS-0001").await;
    let patient_id = patient["patient_id"].as_str().unwrap();

    let by_id: serde_json::Value = app
        .client
        .get(format!("{}/patients/{}", app.address, patient_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(by_id["mrn"], "HOS-0001");
    assert_eq!(by_id["name"], "Amit Shah");

    let by_mrn: serde_json::Value = app
        .client
        .get(format!("{}/patients/HOS-0001", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(by_mrn["patient_id"], patient_id);
}

#[tokio::test]
async fn unknown_patient_returns_not_found_detail() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/patients/HOS-9999", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["detail"], "Patient not found");
}

#[tokio::test]
async fn registration_requires_a_role_header() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/patients", app.address))
        .json(&json!({ "name": "Amit Shah", "mrn": "HOS-0001" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_requires_name_and_mrn() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/patients", app.address))
        .header("X-Role", "Staff")
        .json(&json!({ "name": "", "mrn": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_mrn_conflicts() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    let response = app
        .client
        .post(format!("{}/patients", app.address))
        .header("X-Role", "Doctor")
        .json(&json!({ "name": "Imposter", "mrn": "hos-0001" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn listing_is_newest_first() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;
    app.register_patient("Neha Verma", "HOS-0002").await;

    let patients: Vec<serde_json::Value> = app
        .client
        .get(format!("{}/patients", app.address))
        .header("X-Role", "Staff")
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0]["name"], "Neha Verma");
    assert_eq!(patients[1]["name"], "Amit Shah");
}

#[tokio::test]
async fn patient_export_is_a_csv_attachment() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    let response = app
        .client
        .get(format!("{}/patients/export", app.address))
        .header("X-Role", "Manager")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .contains("patients.csv"));

    let body = response.text().await.expect("Failed to read body");
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("\"name\""));
    assert!(lines[1].contains("\"HOS-0001\""));
    // The internal id never leaks into the export.
    assert!(!body.contains("patient_id"));
}
