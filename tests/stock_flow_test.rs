mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use scanstock_api::entities::stock_event;

#[tokio::test]
async fn item_lifecycle_add_then_remove() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/items",
            Some(json!({
                "scannedCode": "0012345",
                "model": "Speedster",
                "brand": "Acme",
                "color": "red"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = response_json(response).await;
    assert_eq!(item["scannedCode"], "0012345");
    assert_eq!(item["model"], "Speedster");

    let response = app.request(Method::GET, "/items/0012345", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/inventory/add",
            Some(json!({ "barcode": "0012345" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["onHand"], 1);
    assert_eq!(body["event"]["action"], "add");
    assert_eq!(body["event"]["delta"], 1);

    let response = app
        .request(
            Method::POST,
            "/inventory/remove/initiate",
            Some(json!({ "barcode": "0012345" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ConfirmationRequired");
    assert_eq!(body["onHand"], 1);

    let response = app
        .request(
            Method::POST,
            "/inventory/remove/confirm",
            Some(json!({
                "barcode": "0012345",
                "orderId": "SO-77",
                "source": "floor"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "Removed");
    assert_eq!(body["onHand"], 0);
    assert_eq!(body["event"]["action"], "remove");
    // one unit per event; the action kind carries the direction
    assert_eq!(body["event"]["delta"], 1);
    assert_eq!(body["event"]["orderReference"], "SO-77");
    assert!(body["event"]["dateSubtracted"].is_string());
}

#[tokio::test]
async fn zero_stock_removal_is_registered_without_decrement() {
    let app = TestApp::new().await;
    app.request(
        Method::POST,
        "/items",
        Some(json!({ "scannedCode": "555", "model": "Vapor" })),
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/inventory/remove/initiate",
            Some(json!({ "barcode": "555" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "RegisteredZeroStock");
    assert_eq!(body["onHand"], 0);

    // confirming anyway must be refused, not driven negative
    let response = app
        .request(
            Method::POST,
            "/inventory/remove/confirm",
            Some(json!({ "barcode": "555" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn initiate_is_side_effect_free() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/items",
            Some(json!({ "scannedCode": "888", "model": "Glide" })),
        )
        .await;
    let item = response_json(response).await;
    let item_id: Uuid = item["id"].as_str().unwrap().parse().unwrap();

    for _ in 0..2 {
        app.request(
            Method::POST,
            "/inventory/add",
            Some(json!({ "barcode": "888" })),
        )
        .await;
    }

    // asking twice must not move the count
    for _ in 0..2 {
        let response = app
            .request(
                Method::POST,
                "/inventory/remove/initiate",
                Some(json!({ "barcode": "888" })),
            )
            .await;
        let body = response_json(response).await;
        assert_eq!(body["status"], "ConfirmationRequired");
        assert_eq!(body["onHand"], 2);
    }

    let response = app
        .request(
            Method::POST,
            "/inventory/remove/confirm",
            Some(json!({ "barcode": "888" })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["onHand"], 1);

    // ledger holds exactly the committed mutations: two adds, one remove
    let events = stock_event::Entity::find()
        .filter(stock_event::Column::ItemId.eq(item_id))
        .all(app.state.db.as_ref())
        .await
        .expect("query stock events");
    assert_eq!(events.len(), 3);
    assert_eq!(events.iter().filter(|e| e.action == "add").count(), 2);
    assert_eq!(events.iter().filter(|e| e.action == "remove").count(), 1);
    assert!(events.iter().all(|e| e.delta == 1));
}

#[tokio::test]
async fn unknown_barcode_is_a_not_found() {
    let app = TestApp::new().await;

    for uri in [
        "/inventory/add",
        "/inventory/remove/initiate",
        "/inventory/remove/confirm",
    ] {
        let response = app
            .request(Method::POST, uri, Some(json!({ "barcode": "nope" })))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {uri}");
    }

    let response = app.request(Method::GET, "/items/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upsert_requires_code_and_model() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/items", Some(json!({ "scannedCode": "1" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("model"));

    let response = app
        .request(Method::POST, "/items", Some(json!({ "model": "Solo" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upsert_accepts_legacy_pascal_case_payloads() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/items",
            Some(json!({ "ScannedCode": "42", "Model": "Retro", "Brand": "Oldco" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["scannedCode"], "42");
    assert_eq!(body["brand"], "Oldco");
}

#[tokio::test]
async fn upsert_merges_into_the_existing_item() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/items",
            Some(json!({
                "scannedCode": "77",
                "model": "Alpha",
                "brand": "Acme",
                "notes": "scuffed"
            })),
        )
        .await;
    let first = response_json(response).await;

    let response = app
        .request(
            Method::POST,
            "/items",
            Some(json!({
                "scannedCode": "77",
                "model": "Alpha MkII",
                "brand": "Acme"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = response_json(response).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["model"], "Alpha MkII");
    // absent optional fields clear on merge; the inventory date survives
    assert!(second["notes"].is_null());
    assert_eq!(first["inventoriedAt"], second["inventoriedAt"]);
}

#[tokio::test]
async fn on_hand_tracks_adds_and_removes() {
    let app = TestApp::new().await;
    app.request(
        Method::POST,
        "/items",
        Some(json!({ "scannedCode": "900", "model": "Stacker" })),
    )
    .await;

    for expected in 1..=4 {
        let response = app
            .request(
                Method::POST,
                "/inventory/add",
                Some(json!({ "barcode": "900" })),
            )
            .await;
        let body = response_json(response).await;
        assert_eq!(body["onHand"], expected);
    }

    for expected in (2..=3).rev() {
        let response = app
            .request(
                Method::POST,
                "/inventory/remove/confirm",
                Some(json!({ "barcode": "900" })),
            )
            .await;
        let body = response_json(response).await;
        assert_eq!(body["onHand"], expected);
    }
}
