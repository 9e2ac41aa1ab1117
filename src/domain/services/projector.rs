use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;

use crate::domain::models::availability::{BlockedSlot, WeeklyAvailability};
use crate::domain::models::session::{SessionType, TrainingSession};
use crate::domain::services::slots::{minutes_to_time, weekday_index, TimelineIndex};

/// A bookable 1:1 slot as shown to members.
#[derive(Debug, Serialize, Clone)]
pub struct AvailableSlot {
    pub coach_id: String,
    pub coach_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub session_type: SessionType,
    pub is_available: bool,
}

/// Pre-loaded schedule data for one coach over the projection range.
/// `sessions` must include cancelled ones: a cancelled session still owns
/// its `(coach, start)` identity, so its slot cannot be re-offered.
pub struct CoachSchedule<'a> {
    pub coach_id: &'a str,
    pub coach_name: &'a str,
    pub weekly: &'a [WeeklyAvailability],
    pub blocks: &'a [BlockedSlot],
    pub sessions: &'a [TrainingSession],
    pub default_duration_min: i32,
}

/// Walks every calendar day in `[start_date, end_date]` for every coach and
/// emits the individual-training slots a member could book right now:
/// strictly in the future, not overlapping any block, and with no session
/// already occupying the exact start instant.
pub fn project_available_slots(
    coaches: &[CoachSchedule<'_>],
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> Vec<AvailableSlot> {
    let mut out = Vec::new();

    for coach in coaches {
        let block_index = TimelineIndex::build(coach.blocks);
        let taken_starts: HashSet<NaiveDateTime> =
            coach.sessions.iter().map(|s| s.start_time).collect();

        for date in start_date.iter_days().take_while(|d| *d <= end_date) {
            let weekday = weekday_index(date);
            for row in coach
                .weekly
                .iter()
                .filter(|r| r.day_of_week == weekday && r.is_individual)
            {
                let step = row.duration_min.unwrap_or(coach.default_duration_min);
                if step <= 0 {
                    continue;
                }
                let mut cursor = row.start_min;
                while cursor + step <= row.end_min {
                    let start = date.and_time(minutes_to_time(cursor));
                    let end = start + Duration::minutes(step as i64);
                    cursor += step;

                    if start <= now {
                        continue;
                    }
                    if taken_starts.contains(&start) {
                        continue;
                    }
                    if block_index.lookup(start, end).is_some() {
                        continue;
                    }
                    out.push(AvailableSlot {
                        coach_id: coach.coach_id.to_string(),
                        coach_name: coach.coach_name.to_string(),
                        start_time: start,
                        end_time: end,
                        session_type: SessionType::OneToOne,
                        is_available: true,
                    });
                }
            }
        }
    }

    out.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.coach_id.cmp(&b.coach_id)));
    out
}
