//! End-to-end HTTP scenarios against a file-backed database.
//!
//! Drives the full router (both route prefixes, CORS and tracing layers,
//! static uploads) through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use bookstore::config::Config;
use bookstore::handlers::{router, AppState};
use bookstore::storage::{init_storage, Stores};

struct Harness {
    app: Router,
    stores: Stores,
    _dir: TempDir,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let mut config = Config::for_test();
    config.storage.path = dir.path().join("db/bookstore.db").to_string_lossy().into_owned();
    config.uploads.dir = dir.path().join("uploads").to_string_lossy().into_owned();

    let stores = init_storage(&config.storage).await.unwrap();
    let state = AppState::new(&stores, &config);

    Harness {
        app: router(state, &config.uploads),
        stores,
        _dir: dir,
    }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn alice_checks_out_and_tracks_her_order() {
    let h = harness().await;

    let (status, book) = call(
        &h.app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "Bumi",
            "author": "Tere Liye",
            "price": 10.0,
            "category": "Fantasy",
            "stock": 5,
            "description": "First of the series",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["id"], 1);

    let (status, receipt) = call(
        &h.app,
        "POST",
        "/api/checkout",
        Some(json!({
            "customer_name": "Alice",
            "customer_email": "alice@example.com",
            "payment_method": "cash",
            "total_amount": 20.0,
            "details": [{"book_id": 1, "quantity": 2, "price": 10.0}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = receipt["order_code"].as_str().unwrap().to_string();
    let parts: Vec<&str> = code.split('-').collect();
    assert_eq!(parts[0], "B3");
    assert!(chrono::NaiveDate::parse_from_str(parts[1], "%Y%m%d").is_ok());
    assert!((1000..=9999).contains(&parts[2].parse::<u32>().unwrap()));

    let (_, book) = call(&h.app, "GET", "/api/books/1", None).await;
    assert_eq!(book["stock"], 3);

    let (status, order) = call(&h.app, "GET", &format!("/api/check-order?code={code}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order_code"], code.as_str());
    assert_eq!(order["customer_name"], "Alice");
    assert_eq!(order["customer_email"], "alice@example.com");
    assert_eq!(order["payment_method"], "cash");
    assert_eq!(order["total_amount"], 20.0);
    assert_eq!(order["status"], 100);
    assert_eq!(order["details_complete"], true);
    assert_eq!(order["details"][0]["book_id"], 1);
    assert_eq!(order["details"][0]["quantity"], 2);
    assert_eq!(order["details"][0]["price"], 10.0);
    assert_eq!(order["details"][0]["book"]["title"], "Bumi");

    let id = receipt["transaction_id"].as_i64().unwrap();
    let (status, _) = call(
        &h.app,
        "PUT",
        &format!("/api/transactions/{id}/status"),
        Some(json!({"status": 101})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, orders) = call(&h.app, "GET", "/api/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_code"], code.as_str());
    assert_eq!(orders[0]["status"], 101);
    assert_eq!(orders[0]["details"].as_array().unwrap().len(), 1);

    h.stores.close().await;
}

#[tokio::test]
async fn failed_checkout_leaves_catalog_and_orders_untouched() {
    let h = harness().await;

    for (title, stock) in [("Pulang", 5), ("Pergi", 1)] {
        let (status, _) = call(
            &h.app,
            "POST",
            "/books",
            Some(json!({"title": title, "price": 8.0, "stock": stock})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(
        &h.app,
        "POST",
        "/checkout",
        Some(json!({
            "customer_name": "Alice",
            "payment_method": "cash",
            "total_amount": 24.0,
            "details": [
                {"book_id": 1, "quantity": 1, "price": 8.0},
                {"book_id": 2, "quantity": 2, "price": 8.0},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, books) = call(&h.app, "GET", "/books", None).await;
    let stocks: Vec<i64> = books
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["stock"].as_i64().unwrap())
        .collect();
    // newest id first
    assert_eq!(stocks, vec![1, 5]);

    let (_, orders) = call(&h.app, "GET", "/transactions", None).await;
    assert!(orders.as_array().unwrap().is_empty());

    h.stores.close().await;
}

#[tokio::test]
async fn data_survives_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::for_test();
    config.storage.path = dir.path().join("bookstore.db").to_string_lossy().into_owned();

    let stores = init_storage(&config.storage).await.unwrap();
    let app = router(AppState::new(&stores, &config), &config.uploads);
    let (status, _) = call(&app, "POST", "/api/books", Some(json!({"title": "Amba", "stock": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    stores.close().await;

    let stores = init_storage(&config.storage).await.unwrap();
    let app = router(AppState::new(&stores, &config), &config.uploads);
    let (_, books) = call(&app, "GET", "/api/books", None).await;
    assert_eq!(books[0]["title"], "Amba");
    stores.close().await;
}
