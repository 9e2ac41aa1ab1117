use serde::{Deserialize, Serialize};
use chrono::{Local, NaiveDateTime};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum BookingStatus {
    #[serde(rename = "CONFIRMED")]
    #[sqlx(rename = "CONFIRMED")]
    Confirmed,
    #[serde(rename = "CANCELLED_BY_MEMBER")]
    #[sqlx(rename = "CANCELLED_BY_MEMBER")]
    CancelledByMember,
    #[serde(rename = "CANCELLED_BY_COACH")]
    #[sqlx(rename = "CANCELLED_BY_COACH")]
    CancelledByCoach,
}

/// Links a member to a session. History is never deleted; cancelling flips
/// the status and stamps `cancelled_at`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub session_id: String,
    pub member_id: String,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub cancelled_at: Option<NaiveDateTime>,
}

impl Booking {
    pub fn new(session_id: String, member_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            member_id,
            status: BookingStatus::Confirmed,
            created_at: Local::now().naive_local(),
            cancelled_at: None,
        }
    }
}
