use crate::domain::models::session::{SessionStatus, TrainingSession};
use crate::domain::ports::SessionRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INSERT_SESSION: &str = r#"INSERT INTO training_sessions
    (id, coach_id, room_id, recurring_booking_id, title, description, session_type,
     capacity, start_time, end_time, status, is_recurring, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    RETURNING *"#;

fn bind_session<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Sqlite, TrainingSession, sqlx::sqlite::SqliteArguments<'q>>,
    session: &'q TrainingSession,
) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, TrainingSession, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(&session.id)
        .bind(&session.coach_id)
        .bind(&session.room_id)
        .bind(&session.recurring_booking_id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(session.session_type)
        .bind(session.capacity)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.status)
        .bind(session.is_recurring)
        .bind(session.created_at)
}

#[async_trait]
impl SessionRepository for SqliteSessionRepo {
    async fn create(&self, session: &TrainingSession) -> Result<TrainingSession, AppError> {
        bind_session(sqlx::query_as::<_, TrainingSession>(INSERT_SESSION), session)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if AppError::is_unique_violation(&e) {
                    AppError::Conflict("A session already exists at this start time".into())
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn create_batch(&self, sessions: &[TrainingSession]) -> Result<u64, AppError> {
        if sessions.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for session in sessions {
            bind_session(sqlx::query_as::<_, TrainingSession>(INSERT_SESSION), session)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(sessions.len() as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TrainingSession>, AppError> {
        sqlx::query_as::<_, TrainingSession>("SELECT * FROM training_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_in_range(
        &self,
        coach_id: Option<&str>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        include_cancelled: bool,
    ) -> Result<Vec<TrainingSession>, AppError> {
        let mut sql = String::from(
            "SELECT * FROM training_sessions WHERE start_time < ? AND end_time > ?",
        );
        if coach_id.is_some() {
            sql.push_str(" AND coach_id = ?");
        }
        if !include_cancelled {
            sql.push_str(" AND status != 'cancelled'");
        }
        sql.push_str(" ORDER BY start_time ASC");

        let mut query = sqlx::query_as::<_, TrainingSession>(&sql).bind(end).bind(start);
        if let Some(coach_id) = coach_id {
            query = query.bind(coach_id);
        }
        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_scheduled_for_coach(
        &self,
        coach_id: &str,
    ) -> Result<Vec<TrainingSession>, AppError> {
        sqlx::query_as::<_, TrainingSession>(
            r#"SELECT * FROM training_sessions
               WHERE coach_id = ? AND status = 'scheduled'
               ORDER BY start_time ASC"#,
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn starts_in_range(
        &self,
        coach_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, AppError> {
        sqlx::query_scalar::<_, NaiveDateTime>(
            r#"SELECT start_time FROM training_sessions
               WHERE coach_id = ? AND start_time >= ? AND start_time < ?"#,
        )
        .bind(coach_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, status: SessionStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE training_sessions SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Session not found".into()));
        }
        Ok(())
    }

    async fn cancel_with_bookings(&self, id: &str, now: NaiveDateTime) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE training_sessions SET status = 'cancelled' WHERE id = ? AND status = 'scheduled'",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Session is not in a cancellable state".into()));
        }

        sqlx::query(
            r#"UPDATE bookings SET status = 'CANCELLED_BY_COACH', cancelled_at = ?
               WHERE session_id = ? AND status = 'CONFIRMED'"#,
        )
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)
    }

    async fn mark_past_completed(&self, now: NaiveDateTime) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE training_sessions SET status = 'completed' WHERE status = 'scheduled' AND end_time <= ?",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
