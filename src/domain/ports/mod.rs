use crate::domain::models::{
    availability::{AvailabilityAddition, BlockedSlot, WeeklyAvailability},
    booking::{Booking, BookingStatus},
    recurring::RecurringBooking,
    room::{CoachProfile, Room},
    session::{SessionStatus, TrainingSession},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDateTime;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_coaches(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: &Room) -> Result<Room, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, coach_id: &str) -> Result<Option<CoachProfile>, AppError>;
    async fn upsert(&self, profile: &CoachProfile) -> Result<CoachProfile, AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn weekly_for_coach(&self, coach_id: &str) -> Result<Vec<WeeklyAvailability>, AppError>;
    /// Replaces every row of one weekday wholesale (the only mutation the
    /// weekly template supports).
    async fn replace_day(
        &self,
        coach_id: &str,
        day_of_week: i32,
        rows: &[WeeklyAvailability],
    ) -> Result<(), AppError>;

    async fn additions_in_range(
        &self,
        coach_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AvailabilityAddition>, AppError>;
    async fn create_addition(&self, addition: &AvailabilityAddition) -> Result<AvailabilityAddition, AppError>;
    async fn find_addition(&self, id: &str) -> Result<Option<AvailabilityAddition>, AppError>;
    async fn delete_addition(&self, id: &str) -> Result<(), AppError>;

    async fn blocks_in_range(
        &self,
        coach_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<BlockedSlot>, AppError>;
    async fn create_block(&self, block: &BlockedSlot) -> Result<BlockedSlot, AppError>;
    async fn find_block(&self, id: &str) -> Result<Option<BlockedSlot>, AppError>;
    async fn delete_block(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Fails with a conflict if `(coach_id, start_time)` is already taken.
    async fn create(&self, session: &TrainingSession) -> Result<TrainingSession, AppError>;
    /// Inserts a generation batch in one transaction.
    async fn create_batch(&self, sessions: &[TrainingSession]) -> Result<u64, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<TrainingSession>, AppError>;
    async fn list_in_range(
        &self,
        coach_id: Option<&str>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        include_cancelled: bool,
    ) -> Result<Vec<TrainingSession>, AppError>;
    async fn list_scheduled_for_coach(&self, coach_id: &str) -> Result<Vec<TrainingSession>, AppError>;
    /// Start instants of every session (any status) a coach owns in the
    /// range; the duplicate-suppression set for generation.
    async fn starts_in_range(
        &self,
        coach_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, AppError>;
    async fn set_status(&self, id: &str, status: SessionStatus) -> Result<(), AppError>;
    /// Cancels the session and every confirmed booking on it, atomically.
    async fn cancel_with_bookings(&self, id: &str, now: NaiveDateTime) -> Result<(), AppError>;
    /// `scheduled` sessions whose end has passed become `completed`.
    /// Returns the number of rows changed; repeat runs change nothing.
    async fn mark_past_completed(&self, now: NaiveDateTime) -> Result<u64, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Capacity is re-checked against confirmed bookings inside the same
    /// transaction as the insert; losers of a race get a capacity error.
    async fn create_for_session(&self, booking: &Booking) -> Result<Booking, AppError>;
    /// Books a projected free slot: session insert + booking insert in one
    /// transaction, so two members racing for the slot cannot both win.
    async fn create_session_with_booking(
        &self,
        session: &TrainingSession,
        booking: &Booking,
    ) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_member(&self, member_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn cancel(
        &self,
        id: &str,
        status: BookingStatus,
        now: NaiveDateTime,
    ) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait RecurringBookingRepository: Send + Sync {
    async fn create(&self, booking: &RecurringBooking) -> Result<RecurringBooking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<RecurringBooking>, AppError>;
    async fn list_active(&self) -> Result<Vec<RecurringBooking>, AppError>;
    /// Sets the booking CANCELLED and cancels its generated sessions with
    /// `start_time >= now` (cascading to their bookings); the past stays.
    async fn cancel_future_only(&self, id: &str, now: NaiveDateTime) -> Result<u64, AppError>;
}
