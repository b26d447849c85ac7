//! Bill export tests.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn exporting_no_bills_yields_an_empty_body() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/bills/export", app.address))
        .header("X-Role", "Manager")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.expect("Failed to read body"), "");
}

#[tokio::test]
async fn export_has_a_header_and_one_row_per_bill() {
    let app = TestApp::spawn().await;
    app.register_patient("Amit Shah", "HOS-0001").await;

    for price in [100, 200] {
        let response = app
            .create_bill(
                "Manager",
                json!({
                    "patient_id": "HOS-0001",
                    "items": [{ "name": "Consult", "qty": 1, "price": price }]
                }),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    let response = app
        .client
        .get(format!("{}/bills/export", app.address))
        .header("X-Role", "Manager")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .contains("bills.csv"));

    let body = response.text().await.expect("Failed to read body");
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("\"patient_id\","));
    // Item rows and bill ids stay out of the flattened summary.
    assert!(!body.contains("Consult"));
    assert!(!body.contains("bill_id"));
}

#[tokio::test]
async fn embedded_quotes_are_doubled_in_the_export() {
    let app = TestApp::spawn().await;
    app.register_patient("O\"Neil", "HOS-0042").await;

    let response = app
        .create_bill(
            "Doctor",
            json!({
                "patient_id": "HOS-0042",
                "items": [{ "name": "Consult", "qty": 1, "price": 500 }]
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let body = app
        .client
        .get(format!("{}/bills/export", app.address))
        .header("X-Role", "Doctor")
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .expect("Failed to read body");

    assert!(body.contains("\"O\"\"Neil\""));
}
