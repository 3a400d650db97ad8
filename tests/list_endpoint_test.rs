use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::{seed, setup_test_app, setup_test_db};

async fn seeded_app() -> axum::Router {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    seed(&db).await.expect("Failed to seed plants");
    setup_test_app(db)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn names(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|plant| plant["name"].as_str())
        .collect()
}

#[tokio::test]
async fn test_envelope_shape() {
    let app = seeded_app().await;
    let (status, body) = get_json(&app, "/api/plants").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["imageUrl"], "/images/aloe.jpg");
}

#[tokio::test]
async fn test_percent_encoded_query() {
    let app = seeded_app().await;
    let (status, body) = get_json(
        &app,
        "/api/plants?filter%5Bstatus%5D=active%2Cpending&page=2&limit=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 7);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(names(&body), vec!["Fern", "Gardenia"]);
}

#[tokio::test]
async fn test_hostile_query_still_answers() {
    let app = seeded_app().await;
    let (status, body) = get_json(
        &app,
        "/api/plants?page=-3&limit=999999&sort=-password&filter%5Bpassword%5D=x&date_to=never",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["total"], 12);
}

#[tokio::test]
async fn test_category_name_is_resolved_to_ids() {
    let app = seeded_app().await;
    let (status, body) = get_json(&app, "/api/plants?filter%5Bcategory%5D=Herbs&sort=name").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(names(&body), vec!["Basil", "Kale", "Lavender"]);
}

#[tokio::test]
async fn test_several_category_names() {
    let app = seeded_app().await;
    let (_, body) = get_json(
        &app,
        "/api/plants?filter%5Bcategory%5D=Herbs,Succulents&filter%5Bstatus%5D=inactive&sort=-name",
    )
    .await;

    assert_eq!(names(&body), vec!["Lavender", "Kale", "Jade"]);
}

#[tokio::test]
async fn test_unknown_category_answers_empty_page() {
    let app = seeded_app().await;
    let (status, body) = get_json(&app, "/api/plants?filter%5Bcategory%5D=Cacti&page=2&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["totalPages"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_categories_listing() {
    let app = seeded_app().await;
    let (status, body) = get_json(&app, "/api/category?search=kitchen").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Herbs");
}

#[tokio::test]
async fn test_store_failure_is_sanitized() {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    let app = setup_test_app(db.clone());
    db.close().await.unwrap();

    let (status, body) = get_json(&app, "/api/plants").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "A database error occurred");
}

#[tokio::test]
async fn test_content_range_header() {
    let app = seeded_app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/plants?filter%5Bstatus%5D=active&page=2&limit=5")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let content_range = response
        .headers()
        .get("content-range")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(content_range, "plants 5-6/7");
}
