use crate::domain::models::availability::{AvailabilityAddition, WeeklyAvailability};
use crate::domain::models::session::{SessionStatus, TrainingSession};
use crate::domain::services::generator::window_allowed;

/// True when a scheduled session's interval is sanctioned neither by the
/// current weekly template nor by an addition — the coach edited their
/// schedule after the session was created. Additions count as coverage so
/// that "keep as exception" actually clears the conflict.
pub fn session_outside_availability(
    session: &TrainingSession,
    weekly: &[WeeklyAvailability],
    additions: &[AvailabilityAddition],
) -> bool {
    if session.status != SessionStatus::Scheduled {
        return false;
    }
    !window_allowed(weekly, additions, session.start_time, session.end_time)
}

/// Filters a coach's scheduled sessions down to the ones that drifted out
/// of the current availability.
pub fn find_conflicts(
    sessions: Vec<TrainingSession>,
    weekly: &[WeeklyAvailability],
    additions: &[AvailabilityAddition],
) -> Vec<TrainingSession> {
    sessions
        .into_iter()
        .filter(|s| session_outside_availability(s, weekly, additions))
        .collect()
}
