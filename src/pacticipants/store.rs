use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::{StoreError, now_utc, parse_uuid};
use crate::types::{Pacticipant, ValidationErrors};

/// Returns the pacticipant called `name` (case-insensitive), creating it on
/// first reference.
///
/// The insert is attempted first and ignored when the unique index already
/// holds the name, so a caller racing another first reference re-reads the
/// winner's row. Starting with a write also means a surrounding transaction
/// takes the write lock before it has read anything.
pub async fn resolve_or_create(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Pacticipant, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationErrors::single("name", "cannot be blank").into());
    }

    let inserted = sqlx::query(
        r"
        INSERT INTO pacticipants (id, name, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(now_utc())
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() > 0 {
        tracing::info!(pacticipant = name, "pacticipant created");
    }

    find_by_name(conn, name)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("pacticipant {name} not found after insert")))
}

pub async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<Pacticipant>, StoreError> {
    let row = sqlx::query_as::<_, PacticipantRow>(
        r"
        SELECT id, name, created_at
        FROM pacticipants
        WHERE name = ? COLLATE NOCASE
        ",
    )
    .bind(name.trim())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(PacticipantRow::try_into).transpose()
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<Pacticipant>, StoreError> {
    let row = sqlx::query_as::<_, PacticipantRow>(
        "SELECT id, name, created_at FROM pacticipants WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(PacticipantRow::try_into).transpose()
}

#[derive(sqlx::FromRow)]
struct PacticipantRow {
    id: String,
    name: String,
    created_at: String,
}

impl TryFrom<PacticipantRow> for Pacticipant {
    type Error = StoreError;

    fn try_from(row: PacticipantRow) -> Result<Self, Self::Error> {
        Ok(Pacticipant {
            id: parse_uuid("pacticipant id", &row.id)?,
            name: row.name,
            created_at: row.created_at,
        })
    }
}
