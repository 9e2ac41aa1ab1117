use crate::domain::{models::room::CoachProfile, ports::ProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepo {
    async fn find(&self, coach_id: &str) -> Result<Option<CoachProfile>, AppError> {
        sqlx::query_as::<_, CoachProfile>("SELECT * FROM coach_profiles WHERE coach_id = ?")
            .bind(coach_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn upsert(&self, profile: &CoachProfile) -> Result<CoachProfile, AppError> {
        sqlx::query_as::<_, CoachProfile>(
            r#"INSERT INTO coach_profiles (coach_id, default_room_id, slot_duration_min, group_capacity)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(coach_id) DO UPDATE SET
                   default_room_id = excluded.default_room_id,
                   slot_duration_min = excluded.slot_duration_min,
                   group_capacity = excluded.group_capacity
               RETURNING *"#,
        )
        .bind(&profile.coach_id)
        .bind(&profile.default_room_id)
        .bind(profile.slot_duration_min)
        .bind(profile.group_capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}
