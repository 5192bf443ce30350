mod common;

use common::TestApp;
use reqwest::StatusCode;

async fn pay(app: &TestApp, token: &str, customer_id: &str, amount: f64) {
    let response = app
        .client
        .post(format!("{}/api/receipt", app.address))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "customer_id": customer_id,
            "amount_paid": amount,
            "payment_method": "Cash",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn csv_export_is_sorted_and_quoted() {
    let app = TestApp::spawn().await;
    let token = app.signup("csv@example.com").await;

    let response = app
        .import(
            &token,
            serde_json::json!([
                { "name": "Small", "box": "S1", "balance": 10 },
                { "name": "Large", "box": "L1", "balance": 90, "curr": 20, "address": "Street 1, Block A" },
                { "box": "L2" },
            ]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .get(format!("{}/api/customer/export", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv"
    );
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("CustomerReport.csv"));

    let text = response.text().await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Name,Box Numbers,Mobile,Address,Previous Balance,This Month,Total Outstanding"
    );
    assert!(lines[1].starts_with("Large,"));
    assert!(lines[1].contains("\"L1, L2\""));
    assert!(lines[1].contains("\"Street 1, Block A\""));
    assert!(lines[1].ends_with("90,20,110"));
    assert!(lines[2].starts_with("Small,"));

    app.drop_database().await;
}

#[tokio::test]
async fn payment_history_is_listed_and_exported() {
    let app = TestApp::spawn().await;
    let token = app.signup("history@example.com").await;

    let body = app
        .create_customer(
            &token,
            serde_json::json!({ "name": "H", "mobile": "111", "current_month_payment": 100 }),
        )
        .await;
    let id = body["customer"]["id"].as_str().unwrap().to_string();
    pay(&app, &token, &id, 40.0).await;
    pay(&app, &token, &id, 25.0).await;

    let response = app
        .client
        .get(format!("{}/api/customer/history", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let rows = body["history"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "H");
    assert_eq!(rows[0]["amount"], 40.0);

    // A range in the past excludes today's payments.
    let response = app
        .client
        .get(format!(
            "{}/api/customer/history?from=2000-01-01&to=2000-12-31",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["history"].as_array().unwrap().is_empty());

    let response = app
        .client
        .get(format!("{}/api/customer/history/export", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[..2], b"PK");

    app.drop_database().await;
}

#[tokio::test]
async fn malformed_history_range_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.signup("baddate@example.com").await;

    let response = app
        .client
        .get(format!(
            "{}/api/customer/history?from=01-02-2026",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.drop_database().await;
}
