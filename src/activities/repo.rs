use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AppResult;

/// One recorded time-boxed activity. Rows are written once at recording
/// time and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
}

impl Activity {
    pub fn duration_seconds(&self) -> f64 {
        (self.end_time - self.start_time).as_seconds_f64()
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds() / 60.0
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_seconds() / 3600.0
    }

    pub async fn record(
        db: &PgPool,
        user_id: Uuid,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> AppResult<Activity> {
        let activity = sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (id, user_id, start_time, end_time)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, start_time, end_time",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(db)
        .await?;
        Ok(activity)
    }

    /// Activities whose start falls at or after `from`. Feeds the day and
    /// year views.
    pub async fn started_since(db: &PgPool, from: OffsetDateTime) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            "SELECT id, user_id, start_time, end_time
             FROM activities
             WHERE start_time >= $1
             ORDER BY start_time",
        )
        .bind(from)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Activities starting in `[from, to)`. Feeds the month view.
    pub async fn started_between(
        db: &PgPool,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            "SELECT id, user_id, start_time, end_time
             FROM activities
             WHERE start_time >= $1 AND start_time < $2
             ORDER BY start_time",
        )
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Week-view window: starts inside the window AND ends inside it. The
    /// asymmetric upper bound on `end_time` drops activities that spill past
    /// the window end.
    pub async fn contained_in(
        db: &PgPool,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            "SELECT id, user_id, start_time, end_time
             FROM activities
             WHERE start_time >= $1 AND end_time <= $2
             ORDER BY start_time",
        )
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(db: &PgPool) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            "SELECT id, user_id, start_time, end_time
             FROM activities
             ORDER BY start_time DESC",
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
