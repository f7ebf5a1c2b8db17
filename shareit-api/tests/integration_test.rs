use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shareit_api::{app, AppState};
use shareit_core::MemoryDatabase;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryDatabase::new()), 10))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("X-Sharer-User-Id", id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_user(app: &Router, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn create_item(app: &Router, owner: i64, available: bool) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/items",
        Some(owner),
        Some(json!({ "name": "Drill", "description": "Cordless drill", "available": available })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn book(app: &Router, booker: i64, item: i64, start: &str, end: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/bookings",
        Some(booker),
        Some(json!({ "item_id": item, "start": start, "end": end })),
    )
    .await
}

#[tokio::test]
async fn test_booking_lifecycle() {
    let app = test_app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let item = create_item(&app, owner, true).await;

    // 1. Request a booking
    let (status, body) = book(&app, booker, item, "2030-01-01T10:00:00", "2030-01-11T10:00:00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "WAITING");
    assert_eq!(body["start"], "2030-01-01T10:00:00");
    assert_eq!(body["item"]["id"], item);
    assert_eq!(body["booker"]["id"], booker);
    assert_eq!(body["booker"]["email"], "booker@example.com");
    let booking_id = body["id"].as_i64().unwrap();

    // 2. Only the owner may decide
    let uri = format!("/bookings/{}?approved=true", booking_id);
    let (status, _) = send(&app, Method::PATCH, &uri, Some(booker), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    // 3. Approval is final
    let reject = format!("/bookings/{}?approved=false", booking_id);
    let (status, body) = send(&app, Method::PATCH, &reject, Some(owner), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // 4. Touching interval is refused, one second later is fine
    let (status, _) = book(&app, booker, item, "2030-01-11T10:00:00", "2030-01-21T10:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = book(&app, booker, item, "2030-01-11T10:00:01", "2030-01-21T10:00:00").await;
    assert_eq!(status, StatusCode::OK);

    // 5. Both parties can read the booking
    let uri = format!("/bookings/{}", booking_id);
    let (status, as_booker) = send(&app, Method::GET, &uri, Some(booker), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, as_owner) = send(&app, Method::GET, &uri, Some(owner), None).await;
    assert_eq!(as_booker, as_owner);
}

#[tokio::test]
async fn test_admission_errors() {
    let app = test_app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let item = create_item(&app, owner, true).await;
    let closed = create_item(&app, owner, false).await;

    let (status, _) = book(&app, booker, item, "2030-01-01T10:00:00", "2030-01-01T10:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = book(&app, booker, closed, "2030-01-01T10:00:00", "2030-01-02T10:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = book(&app, owner, item, "2030-01-01T10:00:00", "2030-01-02T10:00:00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = book(&app, booker, 999, "2030-01-01T10:00:00", "2030-01-02T10:00:00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_state_filter_and_pagination() {
    let app = test_app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let item = create_item(&app, owner, true).await;

    for day in ["01", "05", "03"] {
        let start = format!("2031-01-{}T00:00:00", day);
        let end = format!("2031-01-{}T12:00:00", day);
        let (_, body) = book(&app, booker, item, &start, &end).await;
        let uri = format!("/bookings/{}?approved=false", body["id"]);
        let (status, _) = send(&app, Method::PATCH, &uri, Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, "/bookings?state=REJECTED", Some(booker), None).await;
    assert_eq!(status, StatusCode::OK);
    let starts: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["start"].as_str().unwrap())
        .collect();
    assert_eq!(
        starts,
        vec!["2031-01-05T00:00:00", "2031-01-03T00:00:00", "2031-01-01T00:00:00"]
    );

    let (status, body) = send(
        &app,
        Method::GET,
        "/bookings/owner?state=ALL&from=2&size=2",
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/bookings?state=BOGUS", Some(booker), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Unknown state: UNSUPPORTED_STATUS");

    let (status, _) = send(&app, Method::GET, "/bookings?from=-1&size=10", Some(booker), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/bookings?from=0&size=0", Some(booker), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sharer_header_is_required() {
    let app = test_app();
    let owner = create_user(&app, "Owner").await;

    let (status, body) = send(&app, Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("X-Sharer-User-Id"));

    let request = Request::builder()
        .uri("/items")
        .header("X-Sharer-User-Id", "abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/items", Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_users_crud() {
    let app = test_app();
    let id = create_user(&app, "Ann").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "name": "Other Ann", "email": "ann@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "name": "Bad", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/users/{}", id);
    let (status, body) = send(&app, Method::PATCH, &uri, None, Some(json!({ "name": "Annie" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Annie");
    assert_eq!(body["email"], "ann@example.com");

    let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("User id={} not found", id));
}

#[tokio::test]
async fn test_items_search_and_comments() {
    let app = test_app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let item = create_item(&app, owner, true).await;

    let (status, body) = send(&app, Method::GET, "/items/search?text=DRILL", Some(booker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/items/search?text=", Some(booker), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let comment_uri = format!("/items/{}/comment", item);
    let (status, _) = send(
        &app,
        Method::POST,
        &comment_uri,
        Some(booker),
        Some(json!({ "text": "Works great" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A finished, approved booking unlocks commenting
    let (_, body) = book(&app, booker, item, "2000-01-01T00:00:00", "2000-01-02T00:00:00").await;
    let uri = format!("/bookings/{}?approved=true", body["id"]);
    send(&app, Method::PATCH, &uri, Some(owner), None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &comment_uri,
        Some(booker),
        Some(json!({ "text": "Works great" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author_name"], "Booker");

    let (status, body) = send(&app, Method::GET, &format!("/items/{}", item), Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["last_booking"]["booker_id"], booker);
    assert!(body["next_booking"].is_null());

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/items/{}", item),
        Some(booker),
        Some(json!({ "available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_requests() {
    let app = test_app();
    let asker = create_user(&app, "Asker").await;
    let lender = create_user(&app, "Lender").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(asker),
        Some(json!({ "description": "Need a ladder" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/items",
        Some(lender),
        Some(json!({
            "name": "Ladder",
            "description": "Three metres",
            "available": true,
            "request_id": request_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/requests", Some(asker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["items"][0]["name"], "Ladder");

    let (_, body) = send(&app, Method::GET, "/requests/all?from=0&size=5", Some(lender), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/requests/999", Some(lender), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
