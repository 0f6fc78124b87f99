mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{response_json, TestApp};
use sea_orm::{EntityTrait, Set};
use serde_json::{json, Value};
use uuid::Uuid;

use scanstock_api::entities::item;

async fn seed(app: &TestApp, code: &str, model: &str, brand: Option<&str>, color: Option<&str>) {
    let mut body = json!({ "scannedCode": code, "model": model });
    if let Some(brand) = brand {
        body["brand"] = Value::String(brand.to_string());
    }
    if let Some(color) = color {
        body["color"] = Value::String(color.to_string());
    }
    let response = app.request(Method::POST, "/items", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn browse_all_orders_by_brand_with_nulls_last() {
    let app = TestApp::new().await;
    seed(&app, "3", "Cruiser", None, None).await;
    seed(&app, "1", "Bolt", Some("Zephyr"), None).await;
    seed(&app, "2", "Apex", Some("Acme"), None).await;

    let response = app.request(Method::GET, "/items/search", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let hits = response_json(response).await;
    let brands: Vec<Value> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["brand"].clone())
        .collect();
    assert_eq!(brands, vec![json!("Acme"), json!("Zephyr"), Value::Null]);
}

#[tokio::test]
async fn ordering_breaks_ties_by_model_then_scan_code() {
    let app = TestApp::new().await;
    seed(&app, "9", "Beta", Some("Acme"), None).await;
    seed(&app, "7", "Alpha", Some("Acme"), None).await;
    seed(&app, "1", "Beta", Some("Acme"), None).await;

    let response = app.request(Method::GET, "/items/search", None).await;
    let hits = response_json(response).await;
    let codes: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["scannedCode"].as_str().unwrap())
        .collect();
    // same brand throughout: model decides first, then scan code
    assert_eq!(codes, vec!["7", "1", "9"]);
}

#[tokio::test]
async fn result_set_is_capped_at_two_hundred() {
    let app = TestApp::new().await;

    let rows: Vec<item::ActiveModel> = (0..205)
        .map(|n| item::ActiveModel {
            id: Set(Uuid::new_v4()),
            scanned_code: Set(format!("bulk-{n:04}")),
            model: Set("Bulk".to_string()),
            brand: Set(Some("Acme".to_string())),
            size: Set(None),
            color: Set(None),
            notes: Set(None),
            purchased_from: Set(None),
            sold_order_reference: Set(None),
            paint_thickness: Set(None),
            price: Set(None),
            quantity_note: Set(None),
            inventoried_at: Set(Utc::now()),
        })
        .collect();
    item::Entity::insert_many(rows)
        .exec(app.state.db.as_ref())
        .await
        .expect("seed bulk items");

    let response = app.request(Method::GET, "/items/search", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 200);
}

#[tokio::test]
async fn filters_and_free_text_combine() {
    let app = TestApp::new().await;
    seed(&app, "10", "Alpha", Some("Acme"), Some("red")).await;
    seed(&app, "11", "Beta", Some("Acme"), Some("blue")).await;
    seed(&app, "12", "Alpha", Some("Zephyr"), Some("red")).await;

    // values of one field are any-of
    let response = app
        .request(Method::GET, "/items/search?brand=Acme,Zephyr", None)
        .await;
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 3);

    // fields combine conjunctively
    let response = app
        .request(Method::GET, "/items/search?brand=Acme&color=red", None)
        .await;
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["scannedCode"], "10");

    // and free text narrows filtered results further
    let response = app
        .request(Method::GET, "/items/search?brand=Acme&q=beta", None)
        .await;
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["model"], "Beta");
}

#[tokio::test]
async fn matching_is_case_insensitive() {
    let app = TestApp::new().await;
    seed(&app, "20", "Alpha", Some("Acme"), None).await;

    let response = app
        .request(Method::GET, "/items/search?q=ALPHA", None)
        .await;
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let response = app
        .request(Method::GET, "/items/search?brand=aCmE", None)
        .await;
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn like_metacharacters_in_free_text_match_literally() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/items",
            Some(json!({ "scannedCode": "30", "model": "M", "notes": "100% wool" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    seed(&app, "31", "M", None, None).await;

    // "100%" must match the literal percent, not act as a wildcard
    let response = app
        .request(Method::GET, "/items/search?q=100%25", None)
        .await;
    let hits = response_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["scannedCode"], "30");

    // a bare underscore is likewise literal
    let response = app
        .request(Method::GET, "/items/search?q=a_b", None)
        .await;
    let hits = response_json(response).await;
    assert!(hits.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_includes_on_hand_quantities() {
    let app = TestApp::new().await;
    seed(&app, "40", "Stocked", Some("Acme"), None).await;
    seed(&app, "41", "Empty", Some("Acme"), None).await;
    for _ in 0..2 {
        app.request(
            Method::POST,
            "/inventory/add",
            Some(json!({ "barcode": "40" })),
        )
        .await;
    }

    let response = app
        .request(Method::GET, "/items/search?brand=Acme", None)
        .await;
    let hits = response_json(response).await;
    let by_code = |code: &str| {
        hits.as_array()
            .unwrap()
            .iter()
            .find(|h| h["scannedCode"] == code)
            .cloned()
            .unwrap()
    };
    assert_eq!(by_code("40")["onHand"], 2);
    assert_eq!(by_code("41")["onHand"], 0);
}

#[tokio::test]
async fn unknown_filter_field_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/items/search?notes=wool", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("notes"));
}

#[tokio::test]
async fn distinct_values_count_and_sort_case_insensitively() {
    let app = TestApp::new().await;
    seed(&app, "50", "A", Some("acme"), None).await;
    seed(&app, "51", "B", Some("Zephyr"), None).await;
    seed(&app, "52", "C", Some("Zephyr"), None).await;
    seed(&app, "53", "D", None, None).await;
    // blank-after-trim values stay out of the facet list
    seed(&app, "54", "E", Some("   "), None).await;

    let response = app
        .request(Method::GET, "/items/distinct?field=brand", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let values = response_json(response).await;
    assert_eq!(
        values,
        json!([
            { "value": "acme", "count": 1 },
            { "value": "Zephyr", "count": 2 }
        ])
    );
}

#[tokio::test]
async fn distinct_rejects_unfilterable_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/items/distinct?field=notes", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.request(Method::GET, "/items/distinct", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
