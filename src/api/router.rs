use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

use crate::api::handlers::{
    admin, auth, availability, booking, conflict, health, recurring, session, slots,
};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Coach schedule: weekly template, additions, blocks
        .route("/api/v1/coaches/{coach_id}/availability", get(availability::get_weekly))
        .route("/api/v1/coaches/{coach_id}/availability/{day}", put(availability::replace_day))
        .route(
            "/api/v1/coaches/{coach_id}/additions",
            get(availability::list_additions).post(availability::create_addition),
        )
        .route("/api/v1/additions/{addition_id}", delete(availability::delete_addition))
        .route(
            "/api/v1/coaches/{coach_id}/blocked-slots",
            get(availability::list_blocks).post(availability::create_block),
        )
        .route("/api/v1/blocked-slots/{block_id}", delete(availability::delete_block))

        // Slot views
        .route("/api/v1/coaches/{coach_id}/day", get(availability::get_day))
        .route("/api/v1/slots", get(slots::get_available_slots))

        // Booking flow
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_my_bookings))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/sessions/{session_id}/book", post(booking::book_session))

        // Sessions (coach authoring + transitions)
        .route("/api/v1/sessions", post(session::create_session).get(session::list_sessions))
        .route("/api/v1/sessions/batch", post(session::create_session_batch))
        .route("/api/v1/sessions/{session_id}/cancel", post(session::cancel_session))
        .route("/api/v1/sessions/{session_id}/complete", post(session::complete_session))
        .route("/api/v1/sessions/{session_id}/no-show", post(session::no_show_session))

        // Recurring bookings
        .route("/api/v1/recurring-bookings", post(recurring::create_recurring))
        .route("/api/v1/recurring-bookings/{booking_id}/cancel", post(recurring::cancel_recurring))

        // Availability conflicts
        .route("/api/v1/coaches/{coach_id}/conflicts", get(conflict::list_conflicts))
        .route("/api/v1/conflicts/{session_id}/keep", post(conflict::resolve_keep_exception))
        .route("/api/v1/conflicts/{session_id}/cancel", post(conflict::resolve_cancel))

        // Generation trigger
        .route("/api/v1/admin/generate-sessions", post(admin::generate_sessions))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                }),
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
