#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::DateTime;
use pact_registry::{
    db::{self, StoreError},
    pacticipants::{find_by_name, resolve_or_create},
    pacts::{PublishPact, create_or_update, find_view, to_view},
    types::{
        PacticipantRef, WebhookAttributes, WebhookEventAttributes, WebhookRequestAttributes,
    },
    webhooks::{IdAssignment, WebhookScope, create_webhook, find_webhook},
};
use sqlx::SqlitePool;
use tempfile::NamedTempFile;

struct TestDb {
    pool: SqlitePool,
    _db_file: NamedTempFile,
}

async fn setup_db() -> TestDb {
    let db_file = NamedTempFile::new().expect("create temp sqlite file");
    let url = format!("sqlite://{}", db_file.path().display());
    let pool = db::connect(&url, 4).await.expect("connect sqlite");

    TestDb {
        pool,
        _db_file: db_file,
    }
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn publish<'a>(version: &'a str, content: &'a str) -> PublishPact<'a> {
    PublishPact {
        provider_name: "Some Provider",
        consumer_name: "Some Consumer",
        consumer_version_number: version,
        json_content: content,
    }
}

fn webhook_attrs() -> WebhookAttributes {
    WebhookAttributes {
        description: Some("trigger build".to_string()),
        enabled: None,
        events: Some(vec![WebhookEventAttributes {
            name: Some("contract_content_changed".to_string()),
        }]),
        request: Some(WebhookRequestAttributes {
            method: Some("POST".to_string()),
            url: Some("https://ci.example.org/build".to_string()),
            headers: Some(BTreeMap::from([(
                "Accept".to_string(),
                "application/json".to_string(),
            )])),
            body: Some(serde_json::json!({ "ref": "main" })),
        }),
        consumer: None,
        provider: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity registry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_or_create_is_case_insensitive() {
    let db = setup_db().await;
    let mut conn = db.pool.acquire().await.unwrap();

    let first = resolve_or_create(&mut conn, "Some Provider").await.unwrap();
    let second = resolve_or_create(&mut conn, "some PROVIDER").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.name, "Some Provider");
    assert_eq!(count(&db.pool, "pacticipants").await, 1);
}

#[tokio::test]
async fn concurrent_first_references_create_one_pacticipant() {
    let db = setup_db().await;

    let resolve = |pool: SqlitePool| async move {
        let mut conn = pool.acquire().await.unwrap();
        resolve_or_create(&mut conn, "Racing Consumer").await
    };
    let (a, b, c) = tokio::join!(
        resolve(db.pool.clone()),
        resolve(db.pool.clone()),
        resolve(db.pool.clone())
    );

    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(b.id, c.id);
    assert_eq!(count(&db.pool, "pacticipants").await, 1);
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let db = setup_db().await;
    let mut conn = db.pool.acquire().await.unwrap();

    let err = resolve_or_create(&mut conn, "   ").await.unwrap_err();

    assert!(matches!(err, StoreError::Invalid(_)));
    assert!(find_by_name(&mut conn, "").await.unwrap().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Pact store
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn republishing_refreshes_updated_at_only() {
    let db = setup_db().await;

    let first = create_or_update(&db.pool, &publish("1.0.0", r#"{"interactions":[]}"#))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = create_or_update(&db.pool, &publish("1.0.0", r#"{"interactions":[1]}"#))
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.pact.id, first.pact.id);
    assert_eq!(second.pact.created_at, first.pact.created_at);
    assert_eq!(first.pact.created_at, first.pact.updated_at);

    let before = DateTime::parse_from_rfc3339(&first.pact.updated_at).unwrap();
    let after = DateTime::parse_from_rfc3339(&second.pact.updated_at).unwrap();
    assert!(after > before);
    assert_eq!(second.pact.json_content, r#"{"interactions":[1]}"#);
    assert_eq!(count(&db.pool, "pacts").await, 1);
}

#[tokio::test]
async fn each_consumer_version_gets_its_own_pact() {
    let db = setup_db().await;

    let first = create_or_update(&db.pool, &publish("1.0.0", "{}")).await.unwrap();
    let second = create_or_update(&db.pool, &publish("1.0.1", "{}")).await.unwrap();

    assert!(second.created);
    assert_ne!(first.pact.id, second.pact.id);
    assert_ne!(first.pact.version_id, second.pact.version_id);
    assert_eq!(count(&db.pool, "versions").await, 2);
    assert_eq!(count(&db.pool, "pacticipants").await, 2);
}

#[tokio::test]
async fn view_follows_version_to_consumer() {
    let db = setup_db().await;

    let published = create_or_update(&db.pool, &publish("2.3.4", r#"{"a":1}"#))
        .await
        .unwrap();
    let mut conn = db.pool.acquire().await.unwrap();
    let view = to_view(&mut conn, &published.pact).await.unwrap();

    assert_eq!(view.id, published.pact.id);
    assert_eq!(view.provider.name, "Some Provider");
    assert_eq!(view.consumer.name, "Some Consumer");
    assert_eq!(view.consumer_version_number, "2.3.4");
    assert_eq!(view.consumer_version.pacticipant_id, view.consumer.id);
    assert_eq!(view.json_content, r#"{"a":1}"#);

    let found = find_view(&db.pool, "some provider", "SOME CONSUMER", "2.3.4")
        .await
        .unwrap()
        .expect("pact is found by coordinates");
    assert_eq!(found, view);
}

#[tokio::test]
async fn invalid_content_writes_nothing() {
    let db = setup_db().await;

    let err = create_or_update(&db.pool, &publish("1.0.0", "[]"))
        .await
        .unwrap_err();

    let StoreError::Invalid(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("content"));
    assert_eq!(count(&db.pool, "pacticipants").await, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhook registry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_webhook_round_trips() {
    let db = setup_db().await;
    let mut attrs = webhook_attrs();
    attrs.provider = Some(PacticipantRef {
        name: Some("Some Provider".to_string()),
    });

    let created = create_webhook(
        &db.pool,
        &attrs,
        &WebhookScope::default(),
        &IdAssignment::Generate,
    )
    .await
    .unwrap();

    assert!(created.created);
    assert!(created.webhook.enabled);
    assert_eq!(created.webhook.consumer, None);
    assert_eq!(
        created.webhook.provider.as_ref().map(|p| p.name.as_str()),
        Some("Some Provider")
    );

    let fetched = find_webhook(&db.pool, &created.webhook.uuid).await.unwrap();
    assert_eq!(fetched, created.webhook);
}

#[tokio::test]
async fn invalid_webhook_leaves_storage_unchanged() {
    let db = setup_db().await;
    let mut attrs = webhook_attrs();
    attrs.description = None;
    attrs.events = None;
    let scope = WebhookScope {
        consumer: Some("Some Consumer".to_string()),
        provider: Some("Some Provider".to_string()),
    };

    let err = create_webhook(&db.pool, &attrs, &scope, &IdAssignment::Generate)
        .await
        .unwrap_err();

    let StoreError::Invalid(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("description"));
    assert!(errors.contains("events"));
    assert_eq!(count(&db.pool, "webhooks").await, 0);
    assert_eq!(count(&db.pool, "pacticipants").await, 0);
}

#[tokio::test]
async fn concurrent_explicit_id_creates_one_webhook() {
    let db = setup_db().await;
    let attrs = webhook_attrs();
    let id = IdAssignment::Explicit("build-trigger".to_string());
    let scope = WebhookScope::default();

    let (a, b) = tokio::join!(
        create_webhook(&db.pool, &attrs, &scope, &id),
        create_webhook(&db.pool, &attrs, &scope, &id)
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.created, b.created);
    assert_eq!(a.webhook, b.webhook);
    assert_eq!(count(&db.pool, "webhooks").await, 1);
}

#[tokio::test]
async fn explicit_id_with_changed_attributes_conflicts() {
    let db = setup_db().await;
    let id = IdAssignment::Explicit("build-trigger".to_string());
    let scope = WebhookScope::default();
    let mut changed = webhook_attrs();
    changed.enabled = Some(false);

    create_webhook(&db.pool, &webhook_attrs(), &scope, &id)
        .await
        .unwrap();
    let err = create_webhook(&db.pool, &changed, &scope, &id)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(count(&db.pool, "webhooks").await, 1);
}

#[tokio::test]
async fn explicit_id_scope_change_conflicts_and_rolls_back() {
    let db = setup_db().await;
    let id = IdAssignment::Explicit("build-trigger".to_string());
    let scoped = WebhookScope {
        consumer: Some("New Consumer".to_string()),
        provider: None,
    };

    create_webhook(&db.pool, &webhook_attrs(), &WebhookScope::default(), &id)
        .await
        .unwrap();
    let err = create_webhook(&db.pool, &webhook_attrs(), &scoped, &id)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(count(&db.pool, "pacticipants").await, 0);
}
