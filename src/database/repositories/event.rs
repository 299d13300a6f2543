//! Event repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::store::{EventStore, EventUpdate, ReserveOutcome};
use crate::models::event::{Event, EventFilter, FieldDefinition, NewEvent, UpdateEventRequest};
use crate::utils::errors::{EventDeskError, Result};

#[derive(Debug, FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    fields: Json<Vec<FieldDefinition>>,
    max_participants: Option<i32>,
    current_participants: i32,
    registration_deadline: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = EventDeskError;

    fn try_from(row: EventRow) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|_| EventDeskError::Storage(format!("event {} has unknown status '{}'", row.id, row.status)))?;

        Ok(Event {
            id: row.id,
            title: row.title,
            description: row.description,
            fields: row.fields.0,
            max_participants: row.max_participants,
            current_participants: row.current_participants,
            registration_deadline: row.registration_deadline,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (title, description, fields, max_participants, registration_deadline, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, title, description, fields, max_participants, current_participants, registration_deadline, status, created_at, updated_at
            "#,
        )
        .bind(event.title)
        .bind(event.description)
        .bind(Json(event.fields))
        .bind(event.max_participants)
        .bind(event.registration_deadline)
        .bind(event.status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, title, description, fields, max_participants, current_participants, registration_deadline, status, created_at, updated_at FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    async fn replace_fields(&self, id: i64, fields: Vec<FieldDefinition>) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET fields = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, title, description, fields, max_participants, current_participants, registration_deadline, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Json(fields))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<EventUpdate> {
        // Each nullable column gets a "present" flag so an explicit null clears it.
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = CASE WHEN $3::BOOLEAN THEN $4::TEXT ELSE description END,
                max_participants = CASE WHEN $5::BOOLEAN THEN $6::INT ELSE max_participants END,
                registration_deadline = CASE WHEN $7::BOOLEAN THEN $8::TIMESTAMPTZ ELSE registration_deadline END,
                status = COALESCE($9, status),
                updated_at = $10
            WHERE id = $1 AND (NOT $5::BOOLEAN OR $6::INT IS NULL OR current_participants <= $6::INT)
            RETURNING id, title, description, fields, max_participants, current_participants, registration_deadline, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description.is_some())
        .bind(request.description.flatten())
        .bind(request.max_participants.is_some())
        .bind(request.max_participants.flatten())
        .bind(request.registration_deadline.is_some())
        .bind(request.registration_deadline.flatten())
        .bind(request.status.map(|status| status.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(EventUpdate::Updated(row.try_into()?));
        }

        let current: Option<(i32,)> =
            sqlx::query_as("SELECT current_participants FROM events WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match current {
            Some((current,)) => EventUpdate::CapacityBelowCurrent { current },
            None => EventUpdate::EventMissing,
        })
    }

    async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let (limit, offset) = filter.window();
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, fields, max_participants, current_participants, registration_deadline, status, created_at, updated_at
            FROM events
            WHERE status = $1
              AND ($2 = FALSE OR registration_deadline IS NULL OR registration_deadline >= $3)
              AND ($4::TEXT IS NULL OR title ILIKE $4 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.effective_status().as_str())
        .bind(filter.open_only)
        .bind(now)
        .bind(filter.search.as_deref().map(contains_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn try_reserve_slot(&self, id: i64) -> Result<ReserveOutcome> {
        let mut conn = self.pool.acquire().await?;
        reserve_slot(&mut conn, id).await
    }

    async fn release_slot(&self, id: i64) -> Result<Option<i32>> {
        let mut conn = self.pool.acquire().await?;
        release_slot(&mut conn, id).await
    }

    async fn resync_participants(&self, id: i64) -> Result<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        // Waits for any admission or release holding the row, so the recount
        // below runs on a snapshot that includes their registrations.
        let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let (current,): (i32,) = sqlx::query_as(
            r#"
            UPDATE events
            SET current_participants = (
                    SELECT COUNT(*)::INT FROM registrations
                    WHERE event_id = $1 AND status <> 'cancelled'
                ),
                updated_at = $2
            WHERE id = $1
            RETURNING current_participants
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(current))
    }
}

/// Take one slot if the event has room.
///
/// Check and increment happen in one statement under the row lock. Inside a
/// transaction the lock is held until commit.
pub(super) async fn reserve_slot(conn: &mut PgConnection, id: i64) -> Result<ReserveOutcome> {
    let reserved: Option<(i32, Option<i32>)> = sqlx::query_as(
        r#"
        UPDATE events
        SET current_participants = current_participants + 1, updated_at = $2
        WHERE id = $1 AND (max_participants IS NULL OR current_participants < max_participants)
        RETURNING current_participants, max_participants
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((current, max)) = reserved {
        return Ok(ReserveOutcome::Reserved { current, max });
    }

    let limit: Option<(Option<i32>,)> = sqlx::query_as("SELECT max_participants FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match limit {
        None => Ok(ReserveOutcome::EventMissing),
        Some((Some(max),)) => Ok(ReserveOutcome::Full { max }),
        Some((None,)) => Err(EventDeskError::Storage(format!(
            "event {} refused a reservation without a capacity limit",
            id
        ))),
    }
}

/// Give back one slot, floored at zero
pub(super) async fn release_slot(conn: &mut PgConnection, id: i64) -> Result<Option<i32>> {
    let current: Option<(i32,)> = sqlx::query_as(
        r#"
        UPDATE events
        SET current_participants = GREATEST(current_participants - 1, 0), updated_at = $2
        WHERE id = $1
        RETURNING current_participants
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(current.map(|(current,)| current))
}

/// `ILIKE` pattern matching `term` literally anywhere in the text
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
