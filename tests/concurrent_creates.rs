use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookinfo_db::DbPool;
use bookinfo_kernel::settings::Settings;
use serde_json::json;
use tower::ServiceExt;

async fn file_backed_app(dir: &tempfile::TempDir) -> (Router, DbPool) {
    let url = format!("sqlite://{}", dir.path().join("books.db").display());
    let db = DbPool::connect(&url, 8).await.unwrap();
    let registry = bookinfo_service::bootstrap::build_registry(&db).unwrap();
    registry.apply_migrations(&db).await.unwrap();
    (bookinfo_http::build_router(&registry, &Settings::default()), db)
}

fn create_request(title: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/book-information")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"Title": title, "Stock": 3, "Available": 3}).to_string(),
        ))
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_creates_with_one_title_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let (app, db) = file_backed_app(&dir).await;

    let mut titles: Vec<String> = (0..20).map(|_| "Dune".to_string()).collect();
    titles.extend((0..20).map(|n| format!("Foundation {n}")));

    let handles: Vec<_> = titles
        .into_iter()
        .map(|title| {
            let app = app.clone();
            tokio::spawn(async move {
                let response = app.oneshot(create_request(&title)).await.unwrap();
                (title, response.status())
            })
        })
        .collect();

    let mut statuses: HashMap<(bool, StatusCode), usize> = HashMap::new();
    for handle in handles {
        let (title, status) = handle.await.unwrap();
        *statuses.entry((title == "Dune", status)).or_default() += 1;
    }

    assert_eq!(statuses.get(&(true, StatusCode::CREATED)), Some(&1));
    assert_eq!(statuses.get(&(true, StatusCode::CONFLICT)), Some(&19));
    assert_eq!(statuses.get(&(false, StatusCode::CREATED)), Some(&20));
    assert_eq!(statuses.len(), 3, "unexpected statuses: {statuses:?}");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_information")
        .fetch_one(db.inner())
        .await
        .unwrap();
    assert_eq!(rows, 21);
}
