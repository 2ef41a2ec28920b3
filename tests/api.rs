//! End-to-end tests over the HTTP router with the in-memory store.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use commerce_api::{app, AppState, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::new(MemoryStore::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_user(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({"name": "Test User", "email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn create_product(app: &Router, name: &str, price: f64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/products",
        Some(json!({"name": name, "price": price})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn create_order(app: &Router, user_id: i64) -> i64 {
    let (status, body) = send(app, Method::POST, "/orders", Some(json!({"user_id": user_id}))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

fn ids(list: &Value) -> Vec<i64> {
    list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn malformed_email_is_rejected_and_valid_email_accepted() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Bad", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"]["email"][0], "must be a valid email");

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Good", "email": "good@example.com", "address": "1 Main St"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "good@example.com");
    assert_eq!(body["data"]["address"], "1 Main St");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = test_app();
    create_user(&app, "dup@example.com").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Again", "email": "dup@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let other = create_user(&app, "other@example.com").await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/users/{other}"),
        Some(json!({"email": "dup@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn negative_price_is_rejected_zero_and_positive_accepted() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Refund", "price": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["price"][0], "cannot be negative");

    create_product(&app, "Freebie", 0.0).await;
    let id = create_product(&app, "Lamp", 19.99).await;
    let (status, body) = send(&app, Method::GET, &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 19.99);
}

#[tokio::test]
async fn order_for_unknown_user_is_rejected() {
    let app = test_app();
    let (status, body) = send(&app, Method::POST, "/orders", Some(json!({"user_id": 404}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["user_id"][0], "does not reference an existing user");
}

#[tokio::test]
async fn order_date_is_taken_from_body() {
    let app = test_app();
    let user = create_user(&app, "dated@example.com").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(json!({"user_id": user, "order_date": "2024-01-02 03:04:05"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["order_date"], "2024-01-02T03:04:05Z");
    assert_eq!(body["data"]["products"], json!([]));
}

#[tokio::test]
async fn add_then_remove_leaves_association_unchanged() {
    let app = test_app();
    let user = create_user(&app, "shopper@example.com").await;
    let order = create_order(&app, user).await;
    let pen = create_product(&app, "Pen", 1.5).await;
    let ink = create_product(&app, "Ink", 4.0).await;

    send(&app, Method::PUT, &format!("/orders/{order}/products/{pen}"), None).await;
    let (_, before) = send(&app, Method::GET, &format!("/orders/{order}/products"), None).await;

    let (status, body) = send(&app, Method::PUT, &format!("/orders/{order}/products/{ink}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["added"], true);
    let (status, _) = send(&app, Method::DELETE, &format!("/orders/{order}/products/{ink}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = send(&app, Method::GET, &format!("/orders/{order}/products"), None).await;
    assert_eq!(before, after);
    assert_eq!(ids(&after), vec![pen]);
}

#[tokio::test]
async fn adding_twice_is_idempotent() {
    let app = test_app();
    let user = create_user(&app, "twice@example.com").await;
    let order = create_order(&app, user).await;
    let pen = create_product(&app, "Pen", 1.5).await;

    let uri = format!("/orders/{order}/products/{pen}");
    let (_, first) = send(&app, Method::PUT, &uri, None).await;
    let (status, second) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["meta"]["added"], false);
    assert_eq!(first["data"], second["data"]);
    assert_eq!(second["data"]["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn order_products_are_listed_by_id() {
    let app = test_app();
    let user = create_user(&app, "sorted@example.com").await;
    let order = create_order(&app, user).await;
    let a = create_product(&app, "A", 1.0).await;
    let b = create_product(&app, "B", 2.0).await;
    let c = create_product(&app, "C", 3.0).await;
    for product in [c, a, b] {
        send(&app, Method::PUT, &format!("/orders/{order}/products/{product}"), None).await;
    }
    let (status, body) = send(&app, Method::GET, &format!("/orders/{order}/products"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![a, b, c]);
    assert_eq!(body["meta"]["count"], 3);

    let (_, order_body) = send(&app, Method::GET, &format!("/orders/{order}"), None).await;
    assert_eq!(order_body["data"]["products"], body["data"]);
}

#[tokio::test]
async fn removing_absent_product_is_not_found() {
    let app = test_app();
    let user = create_user(&app, "absent@example.com").await;
    let order = create_order(&app, user).await;
    let pen = create_product(&app, "Pen", 1.5).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/orders/{order}/products/{pen}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, Method::PUT, &format!("/orders/{order}/products/999"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PUT, &format!("/orders/999/products/{pen}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_user_cascades_to_orders() {
    let app = test_app();
    let user = create_user(&app, "leaving@example.com").await;
    let order = create_order(&app, user).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/users/{user}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &format!("/orders/{order}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/users/{user}/orders"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_product_drops_it_from_orders() {
    let app = test_app();
    let user = create_user(&app, "keep@example.com").await;
    let order = create_order(&app, user).await;
    let pen = create_product(&app, "Pen", 1.5).await;
    send(&app, Method::PUT, &format!("/orders/{order}/products/{pen}"), None).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{pen}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &format!("/orders/{order}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"], json!([]));
}

#[tokio::test]
async fn lists_orders_for_user() {
    let app = test_app();
    let alice = create_user(&app, "alice@example.com").await;
    let bob = create_user(&app, "bob@example.com").await;
    let first = create_order(&app, alice).await;
    create_order(&app, bob).await;
    let second = create_order(&app, alice).await;

    let (status, body) = send(&app, Method::GET, &format!("/users/{alice}/orders"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![first, second]);

    let (_, all) = send(&app, Method::GET, "/orders", None).await;
    assert_eq!(all["meta"]["count"], 3);
}

#[tokio::test]
async fn updates_are_partial() {
    let app = test_app();
    let user = create_user(&app, "partial@example.com").await;
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{user}"),
        Some(json!({"name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["email"], "partial@example.com");

    let product = create_product(&app, "Mug", 8.0).await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{product}"),
        Some(json!({"price": "-3"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["price"][0], "cannot be negative");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/products/999",
        Some(json!({"name": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reassigning_order_requires_existing_user() {
    let app = test_app();
    let owner = create_user(&app, "owner@example.com").await;
    let heir = create_user(&app, "heir@example.com").await;
    let order = create_order(&app, owner).await;

    let (status, _) = send(&app, Method::PUT, &format!("/orders/{order}"), Some(json!({"user_id": 999}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, Method::PUT, &format!("/orders/{order}"), Some(json!({"user_id": heir}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], heir);
}

#[tokio::test]
async fn bad_ids_and_bodies_are_bad_requests() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = send(&app, Method::POST, "/users", Some(json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/products/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_missing_rows_is_not_found() {
    let app = test_app();
    create_user(&app, "taken@example.com").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/999",
        Some(json!({"email": "taken@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, body) = send(&app, Method::PUT, "/orders/999", Some(json!({"user_id": 555}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn malformed_paging_is_a_json_bad_request() {
    let app = test_app();
    for uri in ["/products?limit=abc", "/users?offset=-1", "/orders?limit=1.5"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "bad_request", "{uri}");
        assert!(body["error"]["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn blank_address_is_stored_as_absent() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Blank", "email": "blank@example.com", "address": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["address"].is_null());
}

#[tokio::test]
async fn list_honours_limit_and_offset() {
    let app = test_app();
    let mut created = Vec::new();
    for i in 0..5i32 {
        created.push(create_product(&app, &format!("P{i}"), f64::from(i)).await);
    }
    let (status, body) = send(&app, Method::GET, "/products?limit=2&offset=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), created[1..3].to_vec());
}

#[tokio::test]
async fn common_routes_respond() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "commerce-api");

    let (status, body) = send(&app, Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/orders/{id}/products/{product_id}"].is_object());
}
