use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::{StoreError, now_utc, parse_uuid};
use crate::pacticipants;
use crate::types::{Pacticipant, Webhook, WebhookAttributes, WebhookEvent, WebhookRequest};

use super::validation::{IdAssignment, NewWebhook, WebhookScope, validate};

#[derive(Debug, Clone)]
pub struct CreatedWebhook {
    pub webhook: Webhook,
    /// False when an explicit-id request matched an identical existing webhook.
    pub created: bool,
}

/// Validates and persists a webhook.
///
/// Validation completes before any write. Provider, then consumer, are resolved
/// (and created if unknown) in the same transaction as the webhook insert.
/// With [`IdAssignment::Explicit`] a repeated request with identical attributes
/// returns the stored webhook; differing attributes are a conflict.
pub async fn create_webhook(
    pool: &SqlitePool,
    attrs: &WebhookAttributes,
    scope: &WebhookScope,
    id: &IdAssignment,
) -> Result<CreatedWebhook, StoreError> {
    let new = validate(attrs, scope, id)?;

    let events: Vec<&str> = new.events.iter().map(|e| e.name.as_str()).collect();
    let events = serde_json::to_string(&events)
        .map_err(|err| StoreError::Parse(format!("invalid events JSON: {err}")))?;
    let headers = serde_json::to_string(&new.request.headers)
        .map_err(|err| StoreError::Parse(format!("invalid headers JSON: {err}")))?;
    let body = match &new.request.body {
        Some(body) => Some(
            serde_json::to_string(body)
                .map_err(|err| StoreError::Parse(format!("invalid body JSON: {err}")))?,
        ),
        None => None,
    };

    let now = now_utc();
    let mut tx = pool.begin().await?;

    let provider = match new.provider_name.as_deref() {
        Some(name) => Some(pacticipants::resolve_or_create(&mut *tx, name).await?),
        None => None,
    };
    let consumer = match new.consumer_name.as_deref() {
        Some(name) => Some(pacticipants::resolve_or_create(&mut *tx, name).await?),
        None => None,
    };

    let inserted = sqlx::query(
        r"
        INSERT INTO webhooks (
            uuid,
            description,
            enabled,
            events,
            method,
            url,
            headers,
            body,
            consumer_id,
            provider_id,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (uuid) DO NOTHING
        ",
    )
    .bind(&new.uuid)
    .bind(&new.description)
    .bind(new.enabled)
    .bind(&events)
    .bind(&new.request.method)
    .bind(&new.request.url)
    .bind(&headers)
    .bind(&body)
    .bind(consumer.as_ref().map(|p| p.id.to_string()))
    .bind(provider.as_ref().map(|p| p.id.to_string()))
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    let webhook = fetch_webhook(&mut *tx, &new.uuid)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("webhook {} not found", new.uuid)))?;

    let created = inserted.rows_affected() > 0;
    if !created && !same_attributes(&webhook, &new, consumer.as_ref(), provider.as_ref()) {
        return Err(StoreError::Conflict(format!(
            "webhook {} already exists with different attributes",
            new.uuid
        )));
    }

    tx.commit().await?;

    if created {
        tracing::info!(
            webhook = %webhook.uuid,
            consumer = webhook.consumer.as_ref().map(|p| p.name.as_str()),
            provider = webhook.provider.as_ref().map(|p| p.name.as_str()),
            "webhook created"
        );
    } else {
        tracing::debug!(webhook = %webhook.uuid, "webhook already exists, returning stored copy");
    }

    Ok(CreatedWebhook { webhook, created })
}

pub async fn find_webhook(pool: &SqlitePool, uuid: &str) -> Result<Webhook, StoreError> {
    let mut conn = pool.acquire().await?;
    fetch_webhook(&mut *conn, uuid)
        .await?
        .ok_or_else(|| StoreError::NotFound("webhook not found".to_string()))
}

pub async fn list_webhooks(pool: &SqlitePool) -> Result<Vec<Webhook>, StoreError> {
    let rows = sqlx::query_as::<_, WebhookRow>(&format!(
        "{SELECT_WEBHOOK} ORDER BY w.created_at ASC, w.uuid ASC"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Webhook::try_from).collect()
}

const SELECT_WEBHOOK: &str = "SELECT \
        w.uuid, \
        w.description, \
        w.enabled, \
        w.events, \
        w.method, \
        w.url, \
        w.headers, \
        w.body, \
        w.created_at, \
        w.updated_at, \
        c.id AS consumer_id, \
        c.name AS consumer_name, \
        c.created_at AS consumer_created_at, \
        p.id AS provider_id, \
        p.name AS provider_name, \
        p.created_at AS provider_created_at \
    FROM webhooks w \
    LEFT JOIN pacticipants c ON c.id = w.consumer_id \
    LEFT JOIN pacticipants p ON p.id = w.provider_id";

async fn fetch_webhook(
    conn: &mut SqliteConnection,
    uuid: &str,
) -> Result<Option<Webhook>, StoreError> {
    let row = sqlx::query_as::<_, WebhookRow>(&format!("{SELECT_WEBHOOK} WHERE w.uuid = ?"))
        .bind(uuid)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(Webhook::try_from).transpose()
}

fn same_attributes(
    existing: &Webhook,
    new: &NewWebhook,
    consumer: Option<&Pacticipant>,
    provider: Option<&Pacticipant>,
) -> bool {
    existing.description == new.description
        && existing.enabled == new.enabled
        && existing.events == new.events
        && existing.request == new.request
        && existing.consumer.as_ref().map(|p| p.id) == consumer.map(|p| p.id)
        && existing.provider.as_ref().map(|p| p.id) == provider.map(|p| p.id)
}

#[derive(sqlx::FromRow)]
struct WebhookRow {
    uuid: String,
    description: String,
    enabled: bool,
    events: String,
    method: String,
    url: String,
    headers: String,
    body: Option<String>,
    created_at: String,
    updated_at: String,
    consumer_id: Option<String>,
    consumer_name: Option<String>,
    consumer_created_at: Option<String>,
    provider_id: Option<String>,
    provider_name: Option<String>,
    provider_created_at: Option<String>,
}

impl TryFrom<WebhookRow> for Webhook {
    type Error = StoreError;

    fn try_from(row: WebhookRow) -> Result<Self, Self::Error> {
        let events: Vec<String> = serde_json::from_str(&row.events)
            .map_err(|err| StoreError::Parse(format!("invalid events JSON: {err}")))?;
        let headers: BTreeMap<String, String> = serde_json::from_str(&row.headers)
            .map_err(|err| StoreError::Parse(format!("invalid headers JSON: {err}")))?;
        let body = match row.body.as_deref() {
            Some(raw) => Some(
                serde_json::from_str::<Value>(raw)
                    .map_err(|err| StoreError::Parse(format!("invalid body JSON: {err}")))?,
            ),
            None => None,
        };

        Ok(Webhook {
            uuid: row.uuid,
            description: row.description,
            enabled: row.enabled,
            events: events.into_iter().map(|name| WebhookEvent { name }).collect(),
            request: WebhookRequest {
                method: row.method,
                url: row.url,
                headers,
                body,
            },
            consumer: joined_pacticipant(
                row.consumer_id,
                row.consumer_name,
                row.consumer_created_at,
            )?,
            provider: joined_pacticipant(
                row.provider_id,
                row.provider_name,
                row.provider_created_at,
            )?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn joined_pacticipant(
    id: Option<String>,
    name: Option<String>,
    created_at: Option<String>,
) -> Result<Option<Pacticipant>, StoreError> {
    let (Some(id), Some(name), Some(created_at)) = (id, name, created_at) else {
        return Ok(None);
    };
    Ok(Some(Pacticipant {
        id: parse_uuid("pacticipant id", &id)?,
        name,
        created_at,
    }))
}
