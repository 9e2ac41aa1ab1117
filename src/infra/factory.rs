use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::generator::SessionGenerator;
use crate::infra::repositories::{
    sqlite_availability_repo::SqliteAvailabilityRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_profile_repo::SqliteProfileRepo, sqlite_recurring_repo::SqliteRecurringRepo,
    sqlite_room_repo::SqliteRoomRepo, sqlite_session_repo::SqliteSessionRepo,
    sqlite_user_repo::SqliteUserRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    build_state(config, pool)
}

pub fn build_state(config: &Config, pool: SqlitePool) -> AppState {
    let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
    let profile_repo = Arc::new(SqliteProfileRepo::new(pool.clone()));
    let availability_repo = Arc::new(SqliteAvailabilityRepo::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));
    let recurring_repo = Arc::new(SqliteRecurringRepo::new(pool.clone()));

    let generator = Arc::new(SessionGenerator::new(
        session_repo.clone(),
        recurring_repo.clone(),
        availability_repo.clone(),
        profile_repo.clone(),
        user_repo.clone(),
    ));

    AppState {
        config: config.clone(),
        user_repo,
        room_repo: Arc::new(SqliteRoomRepo::new(pool.clone())),
        profile_repo,
        availability_repo,
        session_repo,
        booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
        recurring_repo,
        auth_service: Arc::new(AuthService::new(config)),
        generator,
    }
}

pub async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
