use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::{StoreError, now_utc, parse_uuid};
use crate::pacticipants;
use crate::types::{Pact, PactView, Pacticipant, Version};

use super::validate_publication;

#[derive(Debug, Clone, Copy)]
pub struct PublishPact<'a> {
    pub provider_name: &'a str,
    pub consumer_name: &'a str,
    pub consumer_version_number: &'a str,
    pub json_content: &'a str,
}

#[derive(Debug, Clone)]
pub struct PublishedPact {
    pub pact: Pact,
    /// False when an existing pact for the same provider and consumer version
    /// was overwritten.
    pub created: bool,
}

/// Publishes a pact for `(provider, consumer version)`, overwriting the content
/// of any pact already stored for that pair.
///
/// Participants and the consumer version are created on first reference. The
/// whole operation runs in one transaction: `created_at` is only set when the
/// row is inserted, `updated_at` is refreshed on every call.
pub async fn create_or_update(
    pool: &SqlitePool,
    req: &PublishPact<'_>,
) -> Result<PublishedPact, StoreError> {
    validate_publication(req)?;

    let now = now_utc();
    let mut tx = pool.begin().await?;

    let provider = pacticipants::resolve_or_create(&mut *tx, req.provider_name).await?;
    let consumer = pacticipants::resolve_or_create(&mut *tx, req.consumer_name).await?;
    let version = find_or_create_version(&mut *tx, &consumer, req.consumer_version_number).await?;

    let new_id = Uuid::new_v4();
    let row = sqlx::query_as::<_, PactRow>(
        r"
        INSERT INTO pacts (id, provider_id, version_id, json_content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (provider_id, version_id) DO UPDATE SET
            json_content = excluded.json_content,
            updated_at = excluded.updated_at
        RETURNING id, provider_id, version_id, json_content, created_at, updated_at
        ",
    )
    .bind(new_id.to_string())
    .bind(provider.id.to_string())
    .bind(version.id.to_string())
    .bind(req.json_content)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let pact = Pact::try_from(row)?;
    let created = pact.id == new_id;

    tracing::info!(
        provider = %provider.name,
        consumer = %consumer.name,
        consumer_version = %version.number,
        pact_id = %pact.id,
        created,
        "pact published"
    );

    Ok(PublishedPact { pact, created })
}

/// Materializes the denormalized view of a stored pact, following the
/// version back to its consumer.
pub async fn to_view(conn: &mut SqliteConnection, pact: &Pact) -> Result<PactView, StoreError> {
    let provider = pacticipants::find_by_id(conn, pact.provider_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("provider not found".to_string()))?;

    let version = sqlx::query_as::<_, VersionRow>(
        "SELECT id, pacticipant_id, number, created_at FROM versions WHERE id = ?",
    )
    .bind(pact.version_id.to_string())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| StoreError::NotFound("consumer version not found".to_string()))?;
    let version = Version::try_from(version)?;

    let consumer = pacticipants::find_by_id(conn, version.pacticipant_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("consumer not found".to_string()))?;

    Ok(PactView {
        id: pact.id,
        provider,
        consumer,
        consumer_version_number: version.number.clone(),
        consumer_version: version,
        json_content: pact.json_content.clone(),
        created_at: pact.created_at.clone(),
        updated_at: pact.updated_at.clone(),
    })
}

pub async fn find_view(
    pool: &SqlitePool,
    provider_name: &str,
    consumer_name: &str,
    consumer_version_number: &str,
) -> Result<Option<PactView>, StoreError> {
    let mut conn = pool.acquire().await?;

    let row = sqlx::query_as::<_, PactRow>(
        r"
        SELECT pa.id, pa.provider_id, pa.version_id, pa.json_content, pa.created_at, pa.updated_at
        FROM pacts pa
        JOIN pacticipants p ON p.id = pa.provider_id
        JOIN versions v ON v.id = pa.version_id
        JOIN pacticipants c ON c.id = v.pacticipant_id
        WHERE p.name = ? COLLATE NOCASE
          AND c.name = ? COLLATE NOCASE
          AND v.number = ?
        ",
    )
    .bind(provider_name.trim())
    .bind(consumer_name.trim())
    .bind(consumer_version_number.trim())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let pact = Pact::try_from(row)?;

    to_view(&mut *conn, &pact).await.map(Some)
}

async fn find_or_create_version(
    conn: &mut SqliteConnection,
    consumer: &Pacticipant,
    number: &str,
) -> Result<Version, StoreError> {
    let number = number.trim();

    sqlx::query(
        r"
        INSERT INTO versions (id, pacticipant_id, number, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (pacticipant_id, number) DO NOTHING
        ",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(consumer.id.to_string())
    .bind(number)
    .bind(now_utc())
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query_as::<_, VersionRow>(
        r"
        SELECT id, pacticipant_id, number, created_at
        FROM versions
        WHERE pacticipant_id = ? AND number = ?
        ",
    )
    .bind(consumer.id.to_string())
    .bind(number)
    .fetch_one(&mut *conn)
    .await?;

    Version::try_from(row)
}

#[derive(sqlx::FromRow)]
struct PactRow {
    id: String,
    provider_id: String,
    version_id: String,
    json_content: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PactRow> for Pact {
    type Error = StoreError;

    fn try_from(row: PactRow) -> Result<Self, Self::Error> {
        Ok(Pact {
            id: parse_uuid("pact id", &row.id)?,
            provider_id: parse_uuid("provider id", &row.provider_id)?,
            version_id: parse_uuid("version id", &row.version_id)?,
            json_content: row.json_content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VersionRow {
    id: String,
    pacticipant_id: String,
    number: String,
    created_at: String,
}

impl TryFrom<VersionRow> for Version {
    type Error = StoreError;

    fn try_from(row: VersionRow) -> Result<Self, Self::Error> {
        Ok(Version {
            id: parse_uuid("version id", &row.id)?,
            pacticipant_id: parse_uuid("pacticipant id", &row.pacticipant_id)?,
            number: row.number,
            created_at: row.created_at,
        })
    }
}
