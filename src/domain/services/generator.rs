use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::availability::{AvailabilityAddition, WeeklyAvailability};
use crate::domain::models::recurring::RecurringBooking;
use crate::domain::models::session::{NewSessionParams, SessionType, TrainingSession};
use crate::domain::models::user::User;
use crate::domain::ports::{
    AvailabilityRepository, ProfileRepository, RecurringBookingRepository, SessionRepository,
    UserRepository,
};
use crate::domain::services::slots::{minute_of_day, overlaps, weekday_index};
use crate::error::AppError;

/// Whether a materialization pass validates occurrences against the
/// coach's availability. Recurring member bookings are enforced; ad-hoc
/// coach-authored batches trust the coach's input and skip the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    Enforce,
    Trust,
}

#[derive(Debug, Default, Serialize, Clone)]
pub struct GenerationReport {
    pub total_generated: u64,
    pub from_recurring_bookings: u64,
    pub from_availability_template: u64,
    pub marked_completed: u64,
}

/// A batch of identical weekly occurrences to materialize.
pub struct BatchSpec {
    pub coach_id: String,
    pub room_id: String,
    pub recurring_booking_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub capacity: i32,
    pub start_min: i32,
    pub end_min: i32,
    pub is_recurring: bool,
}

/// Expands a weekday selection into concrete dates: for each selected
/// weekday, its first occurrence on/after `start_date`, then every
/// `7 * frequency_weeks` days until `end_date` (inclusive). Shared by the
/// recurring materializer and the ad-hoc batch path.
pub fn expand_weekday_occurrences(
    weekdays: &[i32],
    start_date: NaiveDate,
    end_date: NaiveDate,
    frequency_weeks: u32,
) -> Vec<NaiveDate> {
    let step = Duration::days(7 * frequency_weeks.max(1) as i64);
    let mut out = Vec::new();
    for &weekday in weekdays {
        if !(0..=6).contains(&weekday) {
            continue;
        }
        let offset = (weekday - weekday_index(start_date)).rem_euclid(7);
        let mut date = start_date + Duration::days(offset as i64);
        while date <= end_date {
            out.push(date);
            date += step;
        }
    }
    out.sort();
    out.dedup();
    out
}

/// Whether `[start, end)` on the given weekday is sanctioned by the weekly
/// template (window containment, minute arithmetic) or by an addition
/// covering the whole interval.
pub(crate) fn window_allowed(
    weekly: &[WeeklyAvailability],
    additions: &[AvailabilityAddition],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    let weekday = weekday_index(start.date());
    let start_min = minute_of_day(start);
    let end_min = start_min + (end - start).num_minutes() as i32;

    let by_template = weekly
        .iter()
        .any(|r| r.day_of_week == weekday && r.start_min <= start_min && end_min <= r.end_min);
    let by_addition = additions
        .iter()
        .any(|a| a.start_time <= start && end <= a.end_time);

    by_template || by_addition
}

/// Keeps `TrainingSession` rows populated up to the rolling horizon for
/// every active recurring booking and every group window of the weekly
/// templates, and advances past sessions to `completed`. Idempotent:
/// existing `(coach, start)` pairs are never re-created, and re-running
/// over an overlapping window adds nothing.
pub struct SessionGenerator {
    sessions: Arc<dyn SessionRepository>,
    recurring: Arc<dyn RecurringBookingRepository>,
    availability: Arc<dyn AvailabilityRepository>,
    profiles: Arc<dyn ProfileRepository>,
    users: Arc<dyn UserRepository>,
}

impl SessionGenerator {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        recurring: Arc<dyn RecurringBookingRepository>,
        availability: Arc<dyn AvailabilityRepository>,
        profiles: Arc<dyn ProfileRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { sessions, recurring, availability, profiles, users }
    }

    /// The externally triggered entry point. One failing coach or booking
    /// is logged and skipped; the rest of the batch proceeds.
    pub async fn generate_all(
        &self,
        now: NaiveDateTime,
        weeks_ahead: i64,
    ) -> Result<GenerationReport, AppError> {
        let horizon = now.date() + Duration::weeks(weeks_ahead);
        let mut report = GenerationReport::default();

        for booking in self.recurring.list_active().await? {
            match self.generate_for_booking(&booking, now, horizon).await {
                Ok(count) => report.from_recurring_bookings += count,
                Err(e) => warn!(
                    recurring_booking_id = %booking.id,
                    error = %e,
                    "generation failed for recurring booking, continuing"
                ),
            }
        }

        for coach in self.users.list_coaches().await? {
            match self.generate_from_template(&coach, now, horizon).await {
                Ok(count) => report.from_availability_template += count,
                Err(e) => warn!(
                    coach_id = %coach.id,
                    error = %e,
                    "template generation failed for coach, continuing"
                ),
            }
        }

        report.marked_completed = self.sessions.mark_past_completed(now).await?;
        report.total_generated = report.from_recurring_bookings + report.from_availability_template;

        info!(
            total = report.total_generated,
            recurring = report.from_recurring_bookings,
            template = report.from_availability_template,
            completed = report.marked_completed,
            "session generation finished"
        );
        Ok(report)
    }

    /// Generates the 1:1 sessions of one recurring booking inside
    /// `[max(today, start_date), min(horizon, end_date)]`.
    pub async fn generate_for_booking(
        &self,
        booking: &RecurringBooking,
        now: NaiveDateTime,
        horizon: NaiveDate,
    ) -> Result<u64, AppError> {
        let Some(room_id) = self.default_room(&booking.coach_id).await? else {
            warn!(
                coach_id = %booking.coach_id,
                recurring_booking_id = %booking.id,
                "coach has no default room configured, skipping generation"
            );
            return Ok(0);
        };

        let from = now.date().max(booking.start_date);
        let to = booking.end_date.map_or(horizon, |end| end.min(horizon));
        if from > to {
            return Ok(0);
        }

        let occurrences = expand_weekday_occurrences(&[booking.day_of_week], from, to, 1);
        let spec = BatchSpec {
            coach_id: booking.coach_id.clone(),
            room_id,
            recurring_booking_id: Some(booking.id.clone()),
            title: None,
            description: None,
            session_type: SessionType::OneToOne,
            capacity: 1,
            start_min: booking.start_min,
            end_min: booking.end_min,
            is_recurring: true,
        };
        self.materialize_occurrences(&spec, &occurrences, AvailabilityPolicy::Enforce, now)
            .await
    }

    /// Materializes the group windows of a coach's weekly template as
    /// recurring group sessions over the horizon.
    async fn generate_from_template(
        &self,
        coach: &User,
        now: NaiveDateTime,
        horizon: NaiveDate,
    ) -> Result<u64, AppError> {
        let weekly = self.availability.weekly_for_coach(&coach.id).await?;
        let group_rows: Vec<_> = weekly.iter().filter(|r| r.is_group).collect();
        if group_rows.is_empty() {
            return Ok(0);
        }

        let Some(default_room) = self.default_room(&coach.id).await? else {
            warn!(coach_id = %coach.id, "coach has no default room configured, skipping template generation");
            return Ok(0);
        };
        let profile = self.profiles.find(&coach.id).await?;
        let capacity = profile.map_or(8, |p| p.group_capacity);

        let mut generated = 0;
        for row in group_rows {
            let occurrences =
                expand_weekday_occurrences(&[row.day_of_week], now.date(), horizon, 1);
            let spec = BatchSpec {
                coach_id: coach.id.clone(),
                room_id: row.room_id.clone().unwrap_or_else(|| default_room.clone()),
                recurring_booking_id: None,
                title: Some("Group training".to_string()),
                description: None,
                session_type: SessionType::Group,
                capacity,
                start_min: row.start_min,
                end_min: row.end_min,
                is_recurring: true,
            };
            generated += self
                .materialize_occurrences(&spec, &occurrences, AvailabilityPolicy::Enforce, now)
                .await?;
        }
        Ok(generated)
    }

    /// Turns a list of dates into scheduled sessions, skipping past starts,
    /// occupied `(coach, start)` identities, blocked intervals, and (under
    /// `Enforce`) intervals outside the coach's current availability.
    pub async fn materialize_occurrences(
        &self,
        spec: &BatchSpec,
        occurrences: &[NaiveDate],
        policy: AvailabilityPolicy,
        now: NaiveDateTime,
    ) -> Result<u64, AppError> {
        if occurrences.is_empty() {
            return Ok(0);
        }

        let range_start = occurrences[0].and_time(NaiveTime::MIN);
        let range_end = occurrences[occurrences.len() - 1].and_time(NaiveTime::MIN) + Duration::days(1);

        let existing: HashSet<NaiveDateTime> = self
            .sessions
            .starts_in_range(&spec.coach_id, range_start, range_end)
            .await?
            .into_iter()
            .collect();
        // Under `Trust` the coach's input is authoritative: neither blocks
        // nor the template are consulted, only the identity/past guards.
        let (blocks, weekly, additions) = if policy == AvailabilityPolicy::Enforce {
            (
                self.availability
                    .blocks_in_range(&spec.coach_id, range_start, range_end)
                    .await?,
                self.availability.weekly_for_coach(&spec.coach_id).await?,
                self.availability
                    .additions_in_range(&spec.coach_id, range_start, range_end)
                    .await?,
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        let mut accepted = Vec::new();
        for &date in occurrences {
            let day_start = date.and_time(NaiveTime::MIN);
            let start = day_start + Duration::minutes(spec.start_min as i64);
            let end = day_start + Duration::minutes(spec.end_min as i64);

            if start < now {
                continue;
            }
            if existing.contains(&start) {
                continue;
            }
            if blocks
                .iter()
                .any(|b| overlaps(b.start_time, b.end_time, start, end))
            {
                continue;
            }
            if policy == AvailabilityPolicy::Enforce && !window_allowed(&weekly, &additions, start, end) {
                continue;
            }

            accepted.push(TrainingSession::new(NewSessionParams {
                coach_id: spec.coach_id.clone(),
                room_id: spec.room_id.clone(),
                recurring_booking_id: spec.recurring_booking_id.clone(),
                title: spec.title.clone(),
                description: spec.description.clone(),
                session_type: spec.session_type,
                capacity: spec.capacity,
                start_time: start,
                end_time: end,
                is_recurring: spec.is_recurring,
            }));
        }

        self.sessions.create_batch(&accepted).await
    }

    async fn default_room(&self, coach_id: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .profiles
            .find(coach_id)
            .await?
            .and_then(|p| p.default_room_id))
    }
}
