use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::models::availability::parse_hhmm;
use crate::error::AppError;

pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (expected YYYY-MM-DD)".into()))
}

pub fn parse_minutes(s: &str) -> Result<i32, AppError> {
    parse_hhmm(s).ok_or_else(|| AppError::Validation("Invalid time format (expected HH:MM)".into()))
}

pub fn at_minutes(date: NaiveDate, minutes: i32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(minutes as i64)
}

pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}
