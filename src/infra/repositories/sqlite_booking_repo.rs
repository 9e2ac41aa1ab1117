use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::session::{SessionStatus, TrainingSession};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INSERT_BOOKING: &str = r#"INSERT INTO bookings
    (id, session_id, member_id, status, created_at, cancelled_at)
    VALUES (?, ?, ?, ?, ?, ?)
    RETURNING *"#;

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_for_session(&self, booking: &Booking) -> Result<Booking, AppError> {
        // Capacity check and insert share one transaction: of two racing
        // requests for the last seat, exactly one observes the free seat.
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let session = sqlx::query_as::<_, TrainingSession>(
            "SELECT * FROM training_sessions WHERE id = ?",
        )
        .bind(&booking.session_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Session not found".into()))?;

        if session.status != SessionStatus::Scheduled {
            return Err(AppError::Conflict("Session is not open for booking".into()));
        }

        let already_booked: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE session_id = ? AND member_id = ? AND status = 'CONFIRMED'",
        )
        .bind(&booking.session_id)
        .bind(&booking.member_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if already_booked > 0 {
            return Err(AppError::Conflict("Member already has a booking for this session".into()));
        }

        let confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE session_id = ? AND status = 'CONFIRMED'",
        )
        .bind(&booking.session_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if confirmed >= session.capacity as i64 {
            return Err(AppError::CapacityExceeded("Session is fully booked".into()));
        }

        let created = sqlx::query_as::<_, Booking>(INSERT_BOOKING)
            .bind(&booking.id)
            .bind(&booking.session_id)
            .bind(&booking.member_id)
            .bind(booking.status)
            .bind(booking.created_at)
            .bind(booking.cancelled_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn create_session_with_booking(
        &self,
        session: &TrainingSession,
        booking: &Booking,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"INSERT INTO training_sessions
               (id, coach_id, room_id, recurring_booking_id, title, description, session_type,
                capacity, start_time, end_time, status, is_recurring, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
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
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if AppError::is_unique_violation(&e) {
                AppError::Conflict("Slot is no longer available".into())
            } else {
                AppError::Database(e)
            }
        })?;

        let created = sqlx::query_as::<_, Booking>(INSERT_BOOKING)
            .bind(&booking.id)
            .bind(&booking.session_id)
            .bind(&booking.member_id)
            .bind(booking.status)
            .bind(booking.created_at)
            .bind(booking.cancelled_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE session_id = ? ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_member(&self, member_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE member_id = ? ORDER BY created_at DESC",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn cancel(
        &self,
        id: &str,
        status: BookingStatus,
        now: NaiveDateTime,
    ) -> Result<Booking, AppError> {
        let cancelled = sqlx::query_as::<_, Booking>(
            r#"UPDATE bookings SET status = ?, cancelled_at = ?
               WHERE id = ? AND status = 'CONFIRMED'
               RETURNING *"#,
        )
        .bind(status)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match cancelled {
            Some(booking) => Ok(booking),
            None => {
                if self.find_by_id(id).await?.is_some() {
                    Err(AppError::Conflict("Booking is already cancelled".into()))
                } else {
                    Err(AppError::NotFound("Booking not found".into()))
                }
            }
        }
    }
}
