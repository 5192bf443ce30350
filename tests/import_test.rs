mod common;

use common::TestApp;
use mongodb::bson::doc;
use reqwest::StatusCode;

#[tokio::test]
async fn grouped_import_persists_customers_and_boxes() {
    let app = TestApp::spawn().await;
    let token = app.signup("import@example.com").await;

    // A leads with box 1 and balance 10, a continuation row adds box 2, B
    // then tries to claim box 1 again within the same batch.
    let response = app
        .import(
            &token,
            serde_json::json!([
                { "name": "A", "box": "1", "balance": 10 },
                { "box": "2" },
                { "name": "B", "box": "1" },
            ]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["customers_inserted"], 1);
    assert_eq!(body["boxes_inserted"], 2);
    assert_eq!(body["rejected_boxes"][0]["box_number"], "1");
    assert_eq!(body["rejected_boxes"][0]["reason"], "duplicate_in_batch");

    let customer = app
        .db
        .customers()
        .find_one(doc! { "name": "A" }, None)
        .await
        .unwrap()
        .expect("Customer A not found");
    assert_eq!(customer.box_numbers, ["1", "2"]);
    assert_eq!(customer.previous_balance, 10.0);

    // B's only box was rejected, so B never became a customer.
    let b = app
        .db
        .customers()
        .find_one(doc! { "name": "B" }, None)
        .await
        .unwrap();
    assert!(b.is_none());

    let box_count = app
        .db
        .boxes()
        .count_documents(doc! { "customer_id": &customer.id }, None)
        .await
        .unwrap();
    assert_eq!(box_count, 2);

    app.drop_database().await;
}

#[tokio::test]
async fn preexisting_boxes_are_excluded_across_tenants() {
    let app = TestApp::spawn().await;
    let first = app.signup("first@example.com").await;
    let second = app.signup("second@example.com").await;

    let response = app
        .import(&first, serde_json::json!([{ "name": "Owner", "box": "X" }]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Box uniqueness is store-wide: another tenant cannot reclaim X.
    let response = app
        .import(
            &second,
            serde_json::json!([
                { "name": "C", "box": "X", "balance": 99 },
                { "name": "D", "box": "Y" },
            ]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["customers_inserted"], 1);
    assert_eq!(body["boxes_inserted"], 1);
    assert_eq!(body["rejected_boxes"][0]["box_number"], "X");
    assert_eq!(body["rejected_boxes"][0]["reason"], "already_claimed");

    // C had nonzero balance but no surviving boxes, so C was not persisted.
    let c = app
        .db
        .customers()
        .find_one(doc! { "name": "C" }, None)
        .await
        .unwrap();
    assert!(c.is_none());

    app.drop_database().await;
}

#[tokio::test]
async fn empty_import_is_rejected_without_side_effects() {
    let app = TestApp::spawn().await;
    let token = app.signup("empty@example.com").await;

    let response = app.import(&token, serde_json::json!([])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count = app
        .db
        .customers()
        .count_documents(None, None)
        .await
        .unwrap();
    assert_eq!(count, 0);

    app.drop_database().await;
}

#[tokio::test]
async fn contact_fields_and_balances_aggregate_per_group() {
    let app = TestApp::spawn().await;
    let token = app.signup("aggregate@example.com").await;

    let response = app
        .import(
            &token,
            serde_json::json!([
                { "name": "A", "box": "10", "mobile": "111", "address": "Street 1", "balance": "12.5", "curr": 5 },
                { "box": "11", "mobile": "111", "curr": "oops" },
                { "box": "12", "mobile": "222", "address": "Street 1", "balance": 7.5 },
            ]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let customer = app
        .db
        .customers()
        .find_one(doc! { "name": "A" }, None)
        .await
        .unwrap()
        .expect("Customer A not found");
    assert_eq!(customer.mobile, "111, 222");
    assert_eq!(customer.address, "Street 1");
    assert_eq!(customer.previous_balance, 20.0);
    assert_eq!(customer.current_month_payment, 5.0);
    assert_eq!(customer.box_numbers, ["10", "11", "12"]);

    app.drop_database().await;
}

#[tokio::test]
async fn rows_before_first_name_are_ignored() {
    let app = TestApp::spawn().await;
    let token = app.signup("headless@example.com").await;

    let response = app
        .import(
            &token,
            serde_json::json!([
                { "box": "1", "balance": 100 },
                { "name": "A", "box": "2" },
            ]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["customers_inserted"], 1);
    assert_eq!(body["boxes_inserted"], 1);

    let customer = app
        .db
        .customers()
        .find_one(doc! { "name": "A" }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.box_numbers, ["2"]);
    assert_eq!(customer.previous_balance, 0.0);

    app.drop_database().await;
}

#[tokio::test]
async fn reimport_is_idempotent_for_claimed_boxes() {
    let app = TestApp::spawn().await;
    let token = app.signup("retry@example.com").await;

    let rows = serde_json::json!([{ "name": "A", "box": "R1" }, { "box": "R2" }]);
    let response = app.import(&token, rows.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Recovery path after a partial failure: re-importing the same sheet
    // claims nothing new and creates no duplicate customer.
    let response = app.import(&token, rows).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["customers_inserted"], 0);
    assert_eq!(body["boxes_inserted"], 0);
    assert_eq!(body["rejected_boxes"].as_array().unwrap().len(), 2);

    let count = app
        .db
        .customers()
        .count_documents(doc! { "name": "A" }, None)
        .await
        .unwrap();
    assert_eq!(count, 1);

    app.drop_database().await;
}
