use crate::domain::models::recurring::RecurringBooking;
use crate::domain::ports::RecurringBookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

pub struct SqliteRecurringRepo {
    pool: SqlitePool,
}

impl SqliteRecurringRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecurringBookingRepository for SqliteRecurringRepo {
    async fn create(&self, booking: &RecurringBooking) -> Result<RecurringBooking, AppError> {
        sqlx::query_as::<_, RecurringBooking>(
            r#"INSERT INTO recurring_bookings
               (id, coach_id, member_id, day_of_week, start_min, end_min, start_date, end_date, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(&booking.id)
        .bind(&booking.coach_id)
        .bind(&booking.member_id)
        .bind(booking.day_of_week)
        .bind(booking.start_min)
        .bind(booking.end_min)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.status)
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RecurringBooking>, AppError> {
        sqlx::query_as::<_, RecurringBooking>("SELECT * FROM recurring_bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<RecurringBooking>, AppError> {
        sqlx::query_as::<_, RecurringBooking>(
            "SELECT * FROM recurring_bookings WHERE status = 'ACTIVE' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn cancel_future_only(&self, id: &str, now: NaiveDateTime) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE recurring_bookings SET status = 'CANCELLED' WHERE id = ? AND status = 'ACTIVE'",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Recurring booking is not active".into()));
        }

        // Bookings first, while their sessions are still 'scheduled'.
        sqlx::query(
            r#"UPDATE bookings SET status = 'CANCELLED_BY_COACH', cancelled_at = ?2
               WHERE status = 'CONFIRMED' AND session_id IN (
                   SELECT id FROM training_sessions
                   WHERE recurring_booking_id = ?1 AND start_time >= ?3 AND status = 'scheduled')"#,
        )
        .bind(id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let sessions = sqlx::query(
            r#"UPDATE training_sessions SET status = 'cancelled'
               WHERE recurring_booking_id = ? AND start_time >= ? AND status = 'scheduled'"#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(sessions.rows_affected())
    }
}
