use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct WeeklyWindowRequest {
    pub start: String,
    pub end: String,
    #[serde(default = "default_true")]
    pub is_individual: bool,
    #[serde(default)]
    pub is_group: bool,
    pub room_id: Option<String>,
    pub duration_min: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct ReplaceDayRequest {
    pub windows: Vec<WeeklyWindowRequest>,
}

#[derive(Deserialize)]
pub struct CreateAdditionRequest {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_individual: bool,
    #[serde(default)]
    pub is_group: bool,
    pub room_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBlockRequest {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Multi-day blocks (holidays) end on a later date.
    pub end_date: Option<String>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub coach_id: String,
    pub date: String,
    pub time: String,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub session_type: Option<String>,
    pub capacity: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSessionBatchRequest {
    pub weekdays: Vec<i32>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub frequency_weeks: Option<u32>,
    pub start_time: String,
    pub end_time: String,
    pub session_type: Option<String>,
    pub capacity: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateRecurringRequest {
    /// Required when a member books; ignored for coaches (who are the coach).
    pub coach_id: Option<String>,
    /// Required when a coach creates the standing booking for a member.
    pub member_id: Option<String>,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateSessionsRequest {
    pub weeks_ahead: Option<i64>,
}

#[derive(Deserialize)]
pub struct DayQuery {
    pub date: String,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub start: String,
    pub end: String,
    pub coach_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SessionsQuery {
    pub start: String,
    pub end: String,
    pub coach_id: Option<String>,
    #[serde(default)]
    pub include_cancelled: bool,
}
