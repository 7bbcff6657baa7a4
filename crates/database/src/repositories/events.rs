use crate::error::{DatabaseError, Result};
use airsoft_models::{AttendanceStatus, Event, EventAttendance, NewEvent, UpdateEventInput};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, event: &NewEvent) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (club_id, title, description, location, starts_at, ends_at, capacity, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(event.club_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .bind(event.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Partial update; absent or null fields keep their stored value, so
    /// optional fields cannot be cleared this way
    pub async fn update(&self, id: Uuid, input: &UpdateEventInput) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                capacity = COALESCE($7, capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.capacity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Event", &id.to_string()))?;

        Ok(event)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET cancelled_at = COALESCE(cancelled_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Event", &id.to_string()))?;

        Ok(event)
    }

    /// Lock the event row for an attendance change.
    ///
    /// `None` when the event does not exist. Capacity checks made through the
    /// lock hold until `commit`; dropping it rolls back.
    pub async fn lock_for_attendance(&self, id: Uuid) -> Result<Option<EventAttendanceLock>> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        Ok(event.map(|event| EventAttendanceLock { tx, event }))
    }
}

/// An event row locked for the duration of an attendance change
pub struct EventAttendanceLock {
    tx: Transaction<'static, Postgres>,
    event: Event,
}

impl EventAttendanceLock {
    /// The event as read under the lock
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Number of `going` attendees, excluding `except_user`
    pub async fn count_going(&mut self, except_user: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM event_attendances
            WHERE event_id = $1 AND status = $2 AND user_id <> $3
            "#,
        )
        .bind(self.event.id)
        .bind(AttendanceStatus::Going)
        .bind(except_user)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count.0)
    }

    /// Insert or replace the user's attendance status
    pub async fn upsert_attendance(&mut self, user_id: Uuid, status: AttendanceStatus) -> Result<EventAttendance> {
        let attendance = sqlx::query_as::<_, EventAttendance>(
            r#"
            INSERT INTO event_attendances (event_id, user_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO UPDATE SET status = EXCLUDED.status
            RETURNING *
            "#,
        )
        .bind(self.event.id)
        .bind(user_id)
        .bind(status)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(attendance)
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
