use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{Local, NaiveDateTime};
use sqlx::FromRow;

/// Parses a wall-clock `"HH:MM"` string into minutes since midnight.
/// Accepts a single-digit hour (`"9:00"`); `"24:00"` is allowed as an
/// exclusive end-of-day bound. Time-of-day values only exist as strings at
/// the API boundary; everything internal works in minutes.
pub fn parse_hhmm(s: &str) -> Option<i32> {
    let (h, m) = s.split_once(':')?;
    let h: i32 = h.parse().ok()?;
    let m: i32 = m.parse().ok()?;
    if !(0..=24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    let total = h * 60 + m;
    if total > 24 * 60 {
        return None;
    }
    Some(total)
}

pub fn format_hhmm(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// One recurring weekly window of a coach's schedule. Several rows may
/// exist per coach and weekday. `day_of_week` is 0..=6 with 0 = Sunday.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WeeklyAvailability {
    pub id: String,
    pub coach_id: String,
    pub day_of_week: i32,
    pub start_min: i32,
    pub end_min: i32,
    pub is_individual: bool,
    pub is_group: bool,
    pub room_id: Option<String>,
    pub duration_min: Option<i32>,
}

pub struct NewWeeklyWindow {
    pub start_min: i32,
    pub end_min: i32,
    pub is_individual: bool,
    pub is_group: bool,
    pub room_id: Option<String>,
    pub duration_min: Option<i32>,
}

impl WeeklyAvailability {
    pub fn new(coach_id: String, day_of_week: i32, window: NewWeeklyWindow) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            day_of_week,
            start_min: window.start_min,
            end_min: window.end_min,
            is_individual: window.is_individual,
            is_group: window.is_group,
            room_id: window.room_id,
            duration_min: window.duration_min,
        }
    }
}

/// A one-off availability window outside the weekly template, valid only
/// for its own date. Overrides the template for coinciding slot starts.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityAddition {
    pub id: String,
    pub coach_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_individual: bool,
    pub is_group: bool,
    pub room_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl AvailabilityAddition {
    pub fn new(coach_id: String, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            start_time,
            end_time,
            is_individual: true,
            is_group: false,
            room_id: None,
            reason: None,
            created_at: Local::now().naive_local(),
        }
    }
}

/// Explicit unavailability. Takes precedence over both the weekly template
/// and additions for any overlapping instant.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BlockedSlot {
    pub id: String,
    pub coach_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl BlockedSlot {
    pub fn new(coach_id: String, start_time: NaiveDateTime, end_time: NaiveDateTime, reason: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            start_time,
            end_time,
            reason,
            created_at: Local::now().naive_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("9:00"), Some(540));
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), Some(1440));
        assert_eq!(parse_hhmm("24:01"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("noon"), None);
        assert_eq!(parse_hhmm("12"), None);
    }

    #[test]
    fn test_format_hhmm() {
        assert_eq!(format_hhmm(540), "09:00");
        assert_eq!(format_hhmm(1439), "23:59");
        assert_eq!(format_hhmm(0), "00:00");
    }
}
