//! Bill file upload tests.

mod common;

use common::TestApp;
use reqwest::multipart;
use rust_decimal::Decimal;
use serde_json::Value;

fn csv_form(csv: &str, patient_id: Option<&str>) -> multipart::Form {
    let mut form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(csv.as_bytes().to_vec())
            .file_name("bill.csv")
            .mime_str("text/csv")
            .unwrap(),
    );
    if let Some(patient_id) = patient_id {
        form = form.text("patient_id", patient_id.to_string());
    }
    form
}

#[tokio::test]
async fn csv_upload_creates_a_bill() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    let csv = "name,qty,price\nParacetamol 650mg,2,650\n";
    let response = app
        .client
        .post(format!("{}/bills/upload-csv", app.address))
        .header("X-Role", "Manager")
        .multipart(csv_form(csv, Some("HOS-0001")))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let bill: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        bill["total"].as_str().unwrap().parse::<Decimal>().unwrap(),
        Decimal::from(1456)
    );
    assert_eq!(bill["patient_name"], "Amit Shah");

    assert_eq!(app.list_bills("Manager").await.len(), 1);
}

#[tokio::test]
async fn csv_upload_requires_a_billing_role() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    let response = app
        .client
        .post(format!("{}/bills/upload-csv", app.address))
        .header("X-Role", "Staff")
        .multipart(csv_form("name,qty,price\nX,1,10\n", Some("HOS-0001")))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn csv_without_the_expected_header_is_rejected() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    let response = app
        .client
        .post(format!("{}/bills/upload-csv", app.address))
        .header("X-Role", "Manager")
        .multipart(csv_form("foo,bar\n1,2\n", Some("HOS-0001")))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["detail"].as_str().unwrap().contains("header"));
}

#[tokio::test]
async fn csv_upload_without_patient_id_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/bills/upload-csv", app.address))
        .header("X-Role", "Manager")
        .multipart(csv_form("name,qty,price\nX,1,10\n", None))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn csv_upload_for_an_unknown_patient_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/bills/upload-csv", app.address))
        .header("X-Role", "Manager")
        .multipart(csv_form("name,qty,price\nX,1,10\n", Some("HOS-9999")))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(app.list_bills("Manager").await.is_empty());
}

#[tokio::test]
async fn missing_file_field_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let form = multipart::Form::new().text("patient_id", "HOS-0001");
    let response = app
        .client
        .post(format!("{}/bills/upload-csv", app.address))
        .header("X-Role", "Manager")
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["detail"], "No file uploaded");
}

#[tokio::test]
async fn image_upload_answers_unavailable_without_a_reader() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    let form = multipart::Form::new()
        .part(
            "file",
            multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("bill.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        )
        .text("patient_id", "HOS-0001");

    let response = app
        .client
        .post(format!("{}/bills/upload-image", app.address))
        .header("X-Role", "Manager")
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["detail"], "Image bill extraction is not configured");
}
