#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, LOCATION},
    },
};
use http_body_util::BodyExt;
use pact_registry::{app, config::AppConfig, db, hal::HAL_JSON, state::AppState};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const PACT_PATH: &str = "/pacts/provider/Some%20Provider/consumer/Some%20Consumer/version/1.0.0";

struct TestApp {
    app: Router,
    pool: SqlitePool,
    _db_file: NamedTempFile,
}

async fn setup() -> TestApp {
    let db_file = NamedTempFile::new().expect("create temp sqlite file");
    let url = format!("sqlite://{}", db_file.path().display());
    let pool = db::connect(&url, 4).await.expect("connect sqlite");

    let config = AppConfig {
        base_url: "http://example.org".to_string(),
        ..AppConfig::default()
    };
    let app = app(AppState {
        pool: pool.clone(),
        config,
    });

    TestApp {
        app,
        pool,
        _db_file: db_file,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Option<String>, String, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).expect("response body is JSON");

    (status, location, content_type, body)
}

fn pact_content() -> Value {
    json!({
        "consumer": { "name": "Some Consumer" },
        "provider": { "name": "Some Provider" },
        "interactions": [{ "description": "a request for something" }]
    })
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn first_publication_returns_201_with_location() {
    let test = setup().await;

    let (status, location, content_type, body) =
        send(&test.app, Method::PUT, PACT_PATH, Some(pact_content().to_string())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(content_type, HAL_JSON);
    assert_eq!(
        location.as_deref(),
        Some(format!("http://example.org{PACT_PATH}").as_str())
    );
    assert_eq!(body["interactions"], pact_content()["interactions"]);
    assert!(body["createdAt"].is_string());
    assert_eq!(
        body["_links"]["pb:consumer"]["href"],
        json!("http://example.org/pacticipants/Some%20Consumer")
    );
}

#[tokio::test]
async fn republication_overwrites_content_and_keeps_created_at() {
    let test = setup().await;
    let mut updated = pact_content();
    updated["interactions"] = json!([]);

    let (_, _, _, first) =
        send(&test.app, Method::PUT, PACT_PATH, Some(pact_content().to_string())).await;
    let (status, location, _, second) =
        send(&test.app, Method::PUT, PACT_PATH, Some(updated.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(location, None);
    assert_eq!(second["createdAt"], first["createdAt"]);
    assert_eq!(second["interactions"], json!([]));
    assert_eq!(count(&test.pool, "pacts").await, 1);

    let (status, _, _, fetched) = send(&test.app, Method::GET, PACT_PATH, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["interactions"], json!([]));
}

#[tokio::test]
async fn malformed_content_is_rejected_without_writes() {
    let test = setup().await;

    let (status, _, content_type, body) =
        send(&test.app, Method::PUT, PACT_PATH, Some("{ not json".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, HAL_JSON);
    assert!(body["errors"]["content"].is_array());
    assert_eq!(count(&test.pool, "pacticipants").await, 0);
    assert_eq!(count(&test.pool, "versions").await, 0);
    assert_eq!(count(&test.pool, "pacts").await, 0);
}

#[tokio::test]
async fn mismatched_consumer_name_is_rejected() {
    let test = setup().await;
    let mut content = pact_content();
    content["consumer"] = json!({ "name": "Someone Else" });

    let (status, _, _, body) =
        send(&test.app, Method::PUT, PACT_PATH, Some(content.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["consumer.name"].is_array());
}

#[tokio::test]
async fn unknown_pact_returns_404() {
    let test = setup().await;

    let (status, _, content_type, body) = send(&test.app, Method::GET, PACT_PATH, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type, HAL_JSON);
    assert_eq!(body["code"], json!("not_found"));
}

#[tokio::test]
async fn publishing_creates_pacticipants_visible_by_name() {
    let test = setup().await;

    send(&test.app, Method::PUT, PACT_PATH, Some(pact_content().to_string())).await;
    let (status, _, _, body) =
        send(&test.app, Method::GET, "/pacticipants/some%20provider", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Some Provider"));
    assert_eq!(
        body["_links"]["self"]["href"],
        json!("http://example.org/pacticipants/Some%20Provider")
    );
}

#[tokio::test]
async fn unknown_pacticipant_returns_404_without_creating_it() {
    let test = setup().await;

    let (status, _, _, _) = send(&test.app, Method::GET, "/pacticipants/Nobody", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(count(&test.pool, "pacticipants").await, 0);
}
