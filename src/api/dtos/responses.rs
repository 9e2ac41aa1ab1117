use serde::Serialize;
use chrono::NaiveDateTime;

use crate::domain::models::availability::{format_hhmm, WeeklyAvailability};
use crate::domain::models::session::TrainingSession;
use crate::domain::services::slots::{Slot, SlotKind};

#[derive(Serialize)]
pub struct LoginResponse {
    pub csrf_token: String,
    pub user_id: String,
    pub display_name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct WeeklyWindowView {
    pub id: String,
    pub day_of_week: i32,
    pub start: String,
    pub end: String,
    pub is_individual: bool,
    pub is_group: bool,
    pub room_id: Option<String>,
    pub duration_min: Option<i32>,
}

impl From<WeeklyAvailability> for WeeklyWindowView {
    fn from(row: WeeklyAvailability) -> Self {
        Self {
            id: row.id,
            day_of_week: row.day_of_week,
            start: format_hhmm(row.start_min),
            end: format_hhmm(row.end_min),
            is_individual: row.is_individual,
            is_group: row.is_group,
            room_id: row.room_id,
            duration_min: row.duration_min,
        }
    }
}

/// One computed slot of a coach's day, with the record that determined its
/// status flattened in.
#[derive(Serialize)]
pub struct SlotView {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: &'static str,
    pub from_template: bool,
    pub is_exception: bool,
    pub session: Option<TrainingSession>,
    pub block_id: Option<String>,
    pub block_reason: Option<String>,
}

impl From<Slot> for SlotView {
    fn from(slot: Slot) -> Self {
        let (status, is_exception, session, block_id, block_reason) = match slot.kind {
            SlotKind::Free => ("free", false, None, None, None),
            SlotKind::Booked(s) => ("booked", false, Some(s), None, None),
            SlotKind::Blocked(b) => ("blocked", false, None, Some(b.id), b.reason),
            SlotKind::Exceptional(_) => ("exceptional", true, None, None, None),
        };
        Self {
            start_time: slot.start,
            end_time: slot.end,
            status,
            from_template: slot.from_template,
            is_exception,
            session,
            block_id,
            block_reason,
        }
    }
}

#[derive(Serialize)]
pub struct BatchCreatedResponse {
    pub created: u64,
}

#[derive(Serialize)]
pub struct RecurringCancelledResponse {
    pub cancelled_sessions: u64,
}
