pub mod sqlite_availability_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_profile_repo;
pub mod sqlite_recurring_repo;
pub mod sqlite_room_repo;
pub mod sqlite_session_repo;
pub mod sqlite_user_repo;
