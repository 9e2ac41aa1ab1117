use serde::{Deserialize, Serialize};
use chrono::{Local, NaiveDateTime};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum SessionType {
    #[serde(rename = "ONE_TO_ONE")]
    #[sqlx(rename = "ONE_TO_ONE")]
    OneToOne,
    #[serde(rename = "GROUP")]
    #[sqlx(rename = "GROUP")]
    Group,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    /// `scheduled` is the only state with outgoing transitions; `completed`,
    /// `cancelled` and `no_show` are terminal.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        self == SessionStatus::Scheduled && next != SessionStatus::Scheduled
    }

    pub fn is_terminal(self) -> bool {
        self != SessionStatus::Scheduled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no_show",
        }
    }
}

/// The materialized, bookable unit. Identified by `(coach_id, start_time)`
/// for generation purposes (unique index in storage). Never deleted;
/// cancellation is a status change.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TrainingSession {
    pub id: String,
    pub coach_id: String,
    pub room_id: String,
    pub recurring_booking_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub capacity: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: SessionStatus,
    pub is_recurring: bool,
    pub created_at: NaiveDateTime,
}

pub struct NewSessionParams {
    pub coach_id: String,
    pub room_id: String,
    pub recurring_booking_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub capacity: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_recurring: bool,
}

impl TrainingSession {
    pub fn new(params: NewSessionParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id: params.coach_id,
            room_id: params.room_id,
            recurring_booking_id: params.recurring_booking_id,
            title: params.title,
            description: params.description,
            session_type: params.session_type,
            capacity: params.capacity,
            start_time: params.start_time,
            end_time: params.end_time,
            status: SessionStatus::Scheduled,
            is_recurring: params.is_recurring,
            created_at: Local::now().naive_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_transitions() {
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Completed));
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Cancelled));
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::NoShow));
        assert!(!SessionStatus::Scheduled.can_transition_to(SessionStatus::Scheduled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [SessionStatus::Completed, SessionStatus::Cancelled, SessionStatus::NoShow] {
            assert!(terminal.is_terminal());
            for next in [
                SessionStatus::Scheduled,
                SessionStatus::Completed,
                SessionStatus::Cancelled,
                SessionStatus::NoShow,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
