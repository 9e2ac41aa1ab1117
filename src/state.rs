use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    AvailabilityRepository, BookingRepository, ProfileRepository, RecurringBookingRepository,
    RoomRepository, SessionRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::generator::SessionGenerator;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub room_repo: Arc<dyn RoomRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub recurring_repo: Arc<dyn RecurringBookingRepository>,
    pub auth_service: Arc<AuthService>,
    pub generator: Arc<SessionGenerator>,
}
