use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateAdditionRequest, CreateBlockRequest, DayQuery, RangeQuery, ReplaceDayRequest};
use crate::api::dtos::responses::{SlotView, WeeklyWindowView};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::{at_minutes, day_bounds, parse_date, parse_minutes};
use crate::domain::models::availability::{
    AvailabilityAddition, BlockedSlot, NewWeeklyWindow, WeeklyAvailability,
};
use crate::domain::models::user::ROLE_COACH;
use crate::domain::services::slots::{calculate_day_slots, DayContext, DEFAULT_SLOT_MIN};
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_weekly(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(coach_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.availability_repo.weekly_for_coach(&coach_id).await?;
    let views: Vec<WeeklyWindowView> = rows.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

/// Replaces every window of one weekday wholesale, the only mutation the
/// weekly template supports.
pub async fn replace_day(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((coach_id, day)): Path<(String, i32)>,
    Json(payload): Json<ReplaceDayRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_COACH)?;
    user.require_self_or_admin(&coach_id)?;

    if !(0..=6).contains(&day) {
        return Err(AppError::Validation("day_of_week must be between 0 and 6".into()));
    }

    let mut rows = Vec::with_capacity(payload.windows.len());
    for window in &payload.windows {
        let start_min = parse_minutes(&window.start)?;
        let end_min = parse_minutes(&window.end)?;
        if end_min <= start_min {
            return Err(AppError::Validation("End time must be after start time".into()));
        }
        rows.push(WeeklyAvailability::new(
            coach_id.clone(),
            day,
            NewWeeklyWindow {
                start_min,
                end_min,
                is_individual: window.is_individual,
                is_group: window.is_group,
                room_id: window.room_id.clone(),
                duration_min: window.duration_min,
            },
        ));
    }

    state.availability_repo.replace_day(&coach_id, day, &rows).await?;
    info!("Replaced weekly availability for coach {} day {}", coach_id, day);

    let views: Vec<WeeklyWindowView> = rows.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

pub async fn list_additions(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(coach_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, _) = day_bounds(parse_date(&range.start)?);
    let (_, end) = day_bounds(parse_date(&range.end)?);
    let additions = state.availability_repo.additions_in_range(&coach_id, start, end).await?;
    Ok(Json(additions))
}

pub async fn create_addition(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(coach_id): Path<String>,
    Json(payload): Json<CreateAdditionRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_COACH)?;
    user.require_self_or_admin(&coach_id)?;

    let date = parse_date(&payload.date)?;
    let start_min = parse_minutes(&payload.start_time)?;
    let end_min = parse_minutes(&payload.end_time)?;
    if end_min <= start_min {
        return Err(AppError::Validation("End time must be after start time".into()));
    }

    let mut addition = AvailabilityAddition::new(
        coach_id.clone(),
        at_minutes(date, start_min),
        at_minutes(date, end_min),
    );
    addition.is_individual = payload.is_individual;
    addition.is_group = payload.is_group;
    addition.room_id = payload.room_id;
    addition.reason = payload.reason;

    let created = state.availability_repo.create_addition(&addition).await?;
    info!("Created availability addition {} for coach {}", created.id, coach_id);
    Ok(Json(created))
}

pub async fn delete_addition(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(addition_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let addition = state
        .availability_repo
        .find_addition(&addition_id)
        .await?
        .ok_or(AppError::NotFound("Availability addition not found".into()))?;
    user.require_self_or_admin(&addition.coach_id)?;

    state.availability_repo.delete_addition(&addition_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

pub async fn list_blocks(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(coach_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, _) = day_bounds(parse_date(&range.start)?);
    let (_, end) = day_bounds(parse_date(&range.end)?);
    let blocks = state.availability_repo.blocks_in_range(&coach_id, start, end).await?;
    Ok(Json(blocks))
}

pub async fn create_block(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(coach_id): Path<String>,
    Json(payload): Json<CreateBlockRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_COACH)?;
    user.require_self_or_admin(&coach_id)?;

    let start_date = parse_date(&payload.date)?;
    let end_date = match &payload.end_date {
        Some(d) => parse_date(d)?,
        None => start_date,
    };
    let start = at_minutes(start_date, parse_minutes(&payload.start_time)?);
    let end = at_minutes(end_date, parse_minutes(&payload.end_time)?);
    if end <= start {
        return Err(AppError::Validation("End must be after start".into()));
    }

    let block = BlockedSlot::new(coach_id.clone(), start, end, payload.reason);
    let created = state.availability_repo.create_block(&block).await?;
    info!("Created blocked slot {} for coach {}", created.id, coach_id);
    Ok(Json(created))
}

pub async fn delete_block(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(block_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let block = state
        .availability_repo
        .find_block(&block_id)
        .await?
        .ok_or(AppError::NotFound("Blocked slot not found".into()))?;
    user.require_self_or_admin(&block.coach_id)?;

    state.availability_repo.delete_block(&block_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// The coach-dashboard day view: every slot of one date with its derived
/// status (free / booked / blocked / exceptional).
pub async fn get_day(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(coach_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&query.date)?;
    let (day_start, day_end) = day_bounds(date);

    let weekly = state.availability_repo.weekly_for_coach(&coach_id).await?;
    let additions = state
        .availability_repo
        .additions_in_range(&coach_id, day_start, day_end)
        .await?;
    let blocks = state
        .availability_repo
        .blocks_in_range(&coach_id, day_start, day_end)
        .await?;
    let sessions = state
        .session_repo
        .list_in_range(Some(&coach_id), day_start, day_end, false)
        .await?;
    let default_duration = state
        .profile_repo
        .find(&coach_id)
        .await?
        .map_or(DEFAULT_SLOT_MIN, |p| p.slot_duration_min);

    let slots = calculate_day_slots(&DayContext {
        date,
        weekly: &weekly,
        additions: &additions,
        blocks: &blocks,
        sessions: &sessions,
        default_duration_min: default_duration,
    });

    let views: Vec<SlotView> = slots.into_iter().map(Into::into).collect();
    Ok(Json(views))
}
