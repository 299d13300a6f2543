//! Registration repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::database::repositories::event::{release_slot, reserve_slot};
use crate::database::store::{Admission, RegistrationStore, ReserveOutcome, SlotChange};
use crate::models::registration::{
    ContactInfo, FormData, NewRegistration, Registration, RegistrationQuery, RegistrationStats,
    RegistrationStatus,
};
use crate::utils::errors::{EventDeskError, Result};

#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: i64,
    event_id: i64,
    form_data: Json<FormData>,
    contact_name: String,
    contact_email: String,
    contact_phone: String,
    status: String,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = EventDeskError;

    fn try_from(row: RegistrationRow) -> Result<Self> {
        let status = row.status.parse().map_err(|_| {
            EventDeskError::Storage(format!(
                "registration {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        Ok(Registration {
            id: row.id,
            event_id: row.event_id,
            form_data: row.form_data.0,
            contact_info: ContactInfo {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            status,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for RegistrationRepository {
    async fn admit_registration(&self, registration: NewRegistration) -> Result<Admission> {
        let mut tx = self.pool.begin().await?;

        // A refused or failed insert drops the transaction, which rolls the
        // reservation back with it.
        let (current, max) = match reserve_slot(&mut tx, registration.event_id).await? {
            ReserveOutcome::Reserved { current, max } => (current, max),
            ReserveOutcome::Full { max } => return Ok(Admission::Full { max }),
            ReserveOutcome::EventMissing => return Ok(Admission::EventMissing),
        };

        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (event_id, form_data, contact_name, contact_email, contact_phone, status, submitted_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, event_id, form_data, contact_name, contact_email, contact_phone, status, submitted_at, updated_at
            "#,
        )
        .bind(registration.event_id)
        .bind(Json(registration.form_data))
        .bind(registration.contact_info.name)
        .bind(registration.contact_info.email)
        .bind(registration.contact_info.phone)
        .bind(RegistrationStatus::Pending.as_str())
        .bind(registration.submitted_at)
        .fetch_one(&mut *tx)
        .await?;
        let registration = Registration::try_from(row)?;

        tx.commit().await?;
        Ok(Admission::Admitted {
            registration,
            current,
            max,
        })
    }

    async fn find_registration(&self, id: i64) -> Result<Option<Registration>> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            "SELECT id, event_id, form_data, contact_name, contact_email, contact_phone, status, submitted_at, updated_at FROM registrations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Registration::try_from).transpose()
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        expected: RegistrationStatus,
        next: RegistrationStatus,
    ) -> Result<Option<SlotChange>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            UPDATE registrations
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING id, event_id, form_data, contact_name, contact_email, contact_phone, status, submitted_at, updated_at
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let registration = Registration::try_from(row)?;

        let released = if expected.holds_slot() && !next.holds_slot() {
            release_slot(&mut tx, registration.event_id).await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(SlotChange {
            registration,
            released,
        }))
    }

    async fn delete_registration(&self, id: i64) -> Result<Option<SlotChange>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            DELETE FROM registrations
            WHERE id = $1
            RETURNING id, event_id, form_data, contact_name, contact_email, contact_phone, status, submitted_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let registration = Registration::try_from(row)?;

        let released = if registration.status.holds_slot() {
            release_slot(&mut tx, registration.event_id).await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(SlotChange {
            registration,
            released,
        }))
    }

    async fn list_registrations(&self, query: &RegistrationQuery) -> Result<(Vec<Registration>, i64)> {
        let status = query.status.map(|status| status.as_str());

        let rows = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, event_id, form_data, contact_name, contact_email, contact_phone, status, submitted_at, updated_at
            FROM registrations
            WHERE event_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY submitted_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.event_id)
        .bind(status)
        .bind(query.limit)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND ($2::TEXT IS NULL OR status = $2)",
        )
        .bind(query.event_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let registrations = rows
            .into_iter()
            .map(Registration::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((registrations, total.0))
    }

    async fn count_by_status(&self, event_id: i64) -> Result<RegistrationStats> {
        let (total, pending, confirmed, cancelled): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'confirmed'),
                   COUNT(*) FILTER (WHERE status = 'cancelled')
            FROM registrations
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RegistrationStats {
            total,
            pending,
            confirmed,
            cancelled,
        })
    }
}
