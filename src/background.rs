use std::sync::Arc;
use std::time::Duration;
use chrono::Local;
use tokio::time::interval;
use tracing::{error, info, info_span, Instrument};

use crate::state::AppState;

/// Periodic trigger for the session generator: extends every active
/// recurring booking and group template up to the horizon and advances
/// past sessions to completed. Each tick is idempotent, so overlapping or
/// repeated runs cannot create duplicates.
pub async fn start_generation_worker(state: Arc<AppState>) {
    info!(
        "Starting session generation worker (every {}s, {} weeks ahead)...",
        state.config.generation_interval_secs, state.config.generation_weeks_ahead
    );

    let mut ticker = interval(Duration::from_secs(state.config.generation_interval_secs));

    loop {
        ticker.tick().await;

        let span = info_span!("session_generation");
        let state = state.clone();

        async move {
            let now = Local::now().naive_local();
            match state
                .generator
                .generate_all(now, state.config.generation_weeks_ahead)
                .await
            {
                Ok(report) => info!(
                    total = report.total_generated,
                    recurring = report.from_recurring_bookings,
                    template = report.from_availability_template,
                    completed = report.marked_completed,
                    "generation tick finished"
                ),
                Err(e) => error!("generation tick failed: {:?}", e),
            }
        }
        .instrument(span)
        .await;
    }
}
