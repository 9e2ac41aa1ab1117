use serde::{Deserialize, Serialize};
use chrono::{Local, NaiveDate, NaiveDateTime};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum RecurringStatus {
    Active,
    Cancelled,
}

/// A member's standing weekly reservation with a coach. Drives automatic
/// session generation up to the rolling horizon. Cancellation is
/// future-only: already-held sessions stay untouched.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RecurringBooking {
    pub id: String,
    pub coach_id: String,
    pub member_id: String,
    pub day_of_week: i32,
    pub start_min: i32,
    pub end_min: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: RecurringStatus,
    pub created_at: NaiveDateTime,
}

pub struct NewRecurringParams {
    pub coach_id: String,
    pub member_id: String,
    pub day_of_week: i32,
    pub start_min: i32,
    pub end_min: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl RecurringBooking {
    pub fn new(params: NewRecurringParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id: params.coach_id,
            member_id: params.member_id,
            day_of_week: params.day_of_week,
            start_min: params.start_min,
            end_min: params.end_min,
            start_date: params.start_date,
            end_date: params.end_date,
            status: RecurringStatus::Active,
            created_at: Local::now().naive_local(),
        }
    }
}
