use crate::domain::models::availability::{AvailabilityAddition, BlockedSlot, WeeklyAvailability};
use crate::domain::ports::AvailabilityRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

pub struct SqliteAvailabilityRepo {
    pool: SqlitePool,
}

impl SqliteAvailabilityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for SqliteAvailabilityRepo {
    async fn weekly_for_coach(&self, coach_id: &str) -> Result<Vec<WeeklyAvailability>, AppError> {
        sqlx::query_as::<_, WeeklyAvailability>(
            "SELECT * FROM weekly_availability WHERE coach_id = ? ORDER BY day_of_week ASC, start_min ASC",
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn replace_day(
        &self,
        coach_id: &str,
        day_of_week: i32,
        rows: &[WeeklyAvailability],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM weekly_availability WHERE coach_id = ? AND day_of_week = ?")
            .bind(coach_id)
            .bind(day_of_week)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for row in rows {
            sqlx::query(
                r#"INSERT INTO weekly_availability
                   (id, coach_id, day_of_week, start_min, end_min, is_individual, is_group, room_id, duration_min)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&row.id)
            .bind(coach_id)
            .bind(day_of_week)
            .bind(row.start_min)
            .bind(row.end_min)
            .bind(row.is_individual)
            .bind(row.is_group)
            .bind(&row.room_id)
            .bind(row.duration_min)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)
    }

    async fn additions_in_range(
        &self,
        coach_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AvailabilityAddition>, AppError> {
        sqlx::query_as::<_, AvailabilityAddition>(
            r#"SELECT * FROM availability_additions
               WHERE coach_id = ? AND start_time < ? AND end_time > ?
               ORDER BY start_time ASC"#,
        )
        .bind(coach_id)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn create_addition(
        &self,
        addition: &AvailabilityAddition,
    ) -> Result<AvailabilityAddition, AppError> {
        sqlx::query_as::<_, AvailabilityAddition>(
            r#"INSERT INTO availability_additions
               (id, coach_id, start_time, end_time, is_individual, is_group, room_id, reason, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(&addition.id)
        .bind(&addition.coach_id)
        .bind(addition.start_time)
        .bind(addition.end_time)
        .bind(addition.is_individual)
        .bind(addition.is_group)
        .bind(&addition.room_id)
        .bind(&addition.reason)
        .bind(addition.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_addition(&self, id: &str) -> Result<Option<AvailabilityAddition>, AppError> {
        sqlx::query_as::<_, AvailabilityAddition>("SELECT * FROM availability_additions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_addition(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM availability_additions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Availability addition not found".into()));
        }
        Ok(())
    }

    async fn blocks_in_range(
        &self,
        coach_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<BlockedSlot>, AppError> {
        sqlx::query_as::<_, BlockedSlot>(
            r#"SELECT * FROM blocked_slots
               WHERE coach_id = ? AND start_time < ? AND end_time > ?
               ORDER BY start_time ASC"#,
        )
        .bind(coach_id)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn create_block(&self, block: &BlockedSlot) -> Result<BlockedSlot, AppError> {
        sqlx::query_as::<_, BlockedSlot>(
            r#"INSERT INTO blocked_slots (id, coach_id, start_time, end_time, reason, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(&block.id)
        .bind(&block.coach_id)
        .bind(block.start_time)
        .bind(block.end_time)
        .bind(&block.reason)
        .bind(block.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_block(&self, id: &str) -> Result<Option<BlockedSlot>, AppError> {
        sqlx::query_as::<_, BlockedSlot>("SELECT * FROM blocked_slots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_block(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blocked_slots WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Blocked slot not found".into()));
        }
        Ok(())
    }
}
