use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{Local, NaiveDateTime};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub created_at: NaiveDateTime,
}

impl Room {
    pub fn new(name: String, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            capacity,
            created_at: Local::now().naive_local(),
        }
    }
}

/// Per-coach generation settings. A coach without a profile (or without a
/// default room) cannot have sessions materialized for them.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CoachProfile {
    pub coach_id: String,
    pub default_room_id: Option<String>,
    pub slot_duration_min: i32,
    pub group_capacity: i32,
}

impl CoachProfile {
    pub fn new(coach_id: String, default_room_id: Option<String>) -> Self {
        Self {
            coach_id,
            default_room_id,
            slot_duration_min: 60,
            group_capacity: 8,
        }
    }
}
