use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookinfo_db::DbPool;
use bookinfo_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let db = DbPool::in_memory().await.unwrap();
    let registry = bookinfo_service::bootstrap::build_registry(&db).unwrap();
    registry.apply_migrations(&db).await.unwrap();
    bookinfo_http::build_router(&registry, &Settings::default())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, headers, value)
}

#[tokio::test]
async fn create_then_get_returns_the_same_record() {
    let app = app().await;

    let (status, headers, created) = send(
        &app,
        Method::POST,
        "/api/v1/book-information",
        Some(json!({"Title": "Dune", "Stock": 5, "Available": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({"Id": 1, "Title": "Dune", "Stock": 5, "Available": 5}));
    assert_eq!(headers[header::LOCATION], "/api/v1/book-information/1");

    let (status, _, fetched) = send(&app, Method::GET, "/api/v1/book-information/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn every_supported_version_reaches_the_same_store() {
    let app = app().await;

    let (status, headers, _) = send(
        &app,
        Method::POST,
        "/api/v2/book-information",
        Some(json!({"Title": "Emma", "Stock": 2, "Available": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers["api-supported-versions"], "1, 2");

    let (status, _, list) = send(&app, Method::GET, "/api/v1/book-information", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([{"Id": 1, "Title": "Emma", "Stock": 2, "Available": 1}]));

    let (status, _, _) = send(&app, Method::GET, "/api/v3/book-information", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dune_walkthrough() {
    let app = app().await;
    let base = "/api/v1/book-information";

    let (status, _, _) = send(
        &app,
        Method::POST,
        base,
        Some(json!({"Title": "Dune", "Stock": 5, "Available": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        &app,
        Method::POST,
        base,
        Some(json!({"Title": "Dune", "Stock": 2, "Available": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/api/v1/book-information/1",
        Some(json!({"Title": "Dune", "Stock": 5, "Available": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"][0]["field"], "Available");

    let (status, _, body) = send(&app, Method::DELETE, "/api/v1/book-information/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, body) = send(&app, Method::GET, "/api/v1/book-information/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (_, _, list) = send(&app, Method::GET, base, None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn invalid_fields_are_rejected_before_storage() {
    let app = app().await;
    let long_title = "x".repeat(151);

    for (body, field) in [
        (json!({"Title": "", "Stock": 1, "Available": 1}), "Title"),
        (json!({"Title": long_title, "Stock": 1, "Available": 1}), "Title"),
        (json!({"Title": "Dune", "Stock": -1, "Available": 0}), "Stock"),
        (json!({"Title": "Dune", "Stock": 1, "Available": -1}), "Available"),
        (json!({"Title": "Dune", "Stock": 1, "Available": 2}), "Available"),
    ] {
        let (status, _, response) =
            send(&app, Method::POST, "/api/v1/book-information", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["details"][0]["field"], field);
    }

    let (_, _, list) = send(&app, Method::GET, "/api/v1/book-information", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let app = app().await;
    let body = json!({"Title": "Dune", "Stock": 1, "Available": 1});

    let (status, _, _) = send(&app, Method::GET, "/api/v1/book-information/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, Method::PUT, "/api/v1/book-information/99", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, Method::DELETE, "/api/v1/book-information/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let app = app().await;

    let (status, _, body) = send(&app, Method::GET, "/api/v1/book-information/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/book-information",
        Some(json!({"Title": "Dune"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn store_failures_are_opaque() {
    let db = DbPool::in_memory().await.unwrap();
    let registry = bookinfo_service::bootstrap::build_registry(&db).unwrap();
    // No migrations applied: the table does not exist.
    let app = bookinfo_http::build_router(&registry, &Settings::default());

    let (status, _, body) = send(&app, Method::GET, "/api/v1/book-information", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"StatusCode": 500, "Message": "Internal Server Error"}));
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let app = app().await;

    let (status, _, body) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));

    let (status, _, _) = send(&app, Method::GET, "/api/v2/book-information/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, doc) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/book-information/{id}"]["put"].is_object());

    let (status, _, v2) = send(&app, Method::GET, "/docs/v2/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(v2["paths"]["/api/v2/book-information"]["post"].is_object());
    assert!(v2["paths"]["/api/v1/book-information"].is_null());
}
