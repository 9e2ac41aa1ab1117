mod common;

use axum::http::StatusCode;
use common::{fmt_date, next_weekday, TestApp};
use serde_json::json;

async fn setup_monday_coach(app: &TestApp) -> (String, common::AuthHeaders) {
    let coach = app.create_coach("anna").await;
    app.setup_coach_room(&coach.id).await;
    let auth = app.login("anna").await;
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/coaches/{}/availability/1", coach.id),
            Some(&auth),
            Some(json!({ "windows": [{ "start": "09:00", "end": "12:00" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    (coach.id, auth)
}

#[tokio::test]
async fn test_book_slot_creates_session_and_booking() {
    let app = TestApp::new().await;
    let (coach_id, _) = setup_monday_coach(&app).await;
    app.create_member("bob").await;
    let member = app.login("bob").await;

    let monday = fmt_date(next_weekday(1));
    let (status, booking) = app
        .request(
            "POST",
            "/api/v1/bookings",
            Some(&member),
            Some(json!({ "coach_id": coach_id, "date": monday, "time": "10:00" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "CONFIRMED");

    // The materialized session is visible and 1:1.
    let (_, sessions) = app
        .request(
            "GET",
            &format!("/api/v1/sessions?start={}&end={}&coach_id={}", monday, monday, coach_id),
            Some(&member),
            None,
        )
        .await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["session_type"], "ONE_TO_ONE");
    assert_eq!(sessions[0]["capacity"], 1);
    assert_eq!(sessions[0]["status"], "scheduled");

    // The booked slot disappears from the projector; the others remain.
    let (_, slots) = app
        .request(
            "GET",
            &format!("/api/v1/slots?start={}&end={}&coach_id={}", monday, monday, coach_id),
            Some(&member),
            None,
        )
        .await;
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert!(!slots
        .iter()
        .any(|s| s["start_time"].as_str().unwrap().contains("T10:00:00")));

    // And the coach day view shows it as booked.
    let (_, day) = app
        .request(
            "GET",
            &format!("/api/v1/coaches/{}/day?date={}", coach_id, monday),
            Some(&member),
            None,
        )
        .await;
    let day = day.as_array().unwrap();
    assert_eq!(day[1]["status"], "booked");
}

#[tokio::test]
async fn test_double_booking_same_slot_conflicts() {
    let app = TestApp::new().await;
    let (coach_id, _) = setup_monday_coach(&app).await;
    app.create_member("bob").await;
    app.create_member("carla").await;
    let bob = app.login("bob").await;
    let carla = app.login("carla").await;

    let monday = fmt_date(next_weekday(1));
    let payload = json!({ "coach_id": coach_id, "date": monday, "time": "10:00" });

    let (status, _) = app.request("POST", "/api/v1/bookings", Some(&bob), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("POST", "/api/v1/bookings", Some(&carla), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("not available"));
}

#[tokio::test]
async fn test_booking_in_the_past_rejected() {
    let app = TestApp::new().await;
    let (coach_id, _) = setup_monday_coach(&app).await;
    app.create_member("bob").await;
    let bob = app.login("bob").await;

    let last_monday = fmt_date(next_weekday(1) - chrono::Duration::days(14));
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/bookings",
            Some(&bob),
            Some(json!({ "coach_id": coach_id, "date": last_monday, "time": "10:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_group_capacity_enforced() {
    let app = TestApp::new().await;
    let coach = app.create_coach("anna").await;
    app.setup_coach_room(&coach.id).await;
    let coach_auth = app.login("anna").await;

    let monday = fmt_date(next_weekday(1));
    let (status, session) = app
        .request(
            "POST",
            "/api/v1/sessions",
            Some(&coach_auth),
            Some(json!({
                "date": monday,
                "start_time": "18:00",
                "end_time": "19:00",
                "session_type": "GROUP",
                "capacity": 2,
                "title": "HIIT circuit"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = session["id"].as_str().unwrap().to_string();

    for name in ["m1", "m2", "m3"] {
        app.create_member(name).await;
    }

    let m1 = app.login("m1").await;
    let (status, _) = app
        .request("POST", &format!("/api/v1/sessions/{}/book", session_id), Some(&m1), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Same member cannot take a second seat.
    let (status, _) = app
        .request("POST", &format!("/api/v1/sessions/{}/book", session_id), Some(&m1), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let m2 = app.login("m2").await;
    let (status, _) = app
        .request("POST", &format!("/api/v1/sessions/{}/book", session_id), Some(&m2), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Capacity 2 is exhausted; the third member is rejected.
    let m3 = app.login("m3").await;
    let (status, body) = app
        .request("POST", &format!("/api/v1/sessions/{}/book", session_id), Some(&m3), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("fully booked"));

    // A cancelled seat opens the session up again.
    let (_, bookings) = app.request("GET", "/api/v1/bookings", Some(&m1), None).await;
    let booking_id = bookings.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(&m1), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("POST", &format!("/api/v1/sessions/{}/book", session_id), Some(&m3), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_member_cancel_keeps_slot_identity() {
    let app = TestApp::new().await;
    let (coach_id, _) = setup_monday_coach(&app).await;
    app.create_member("bob").await;
    let bob = app.login("bob").await;

    let monday = fmt_date(next_weekday(1));
    let (_, booking) = app
        .request(
            "POST",
            "/api/v1/bookings",
            Some(&bob),
            Some(json!({ "coach_id": coach_id, "date": monday, "time": "10:00" })),
        )
        .await;
    let booking_id = booking["id"].as_str().unwrap();

    let (status, cancelled) = app
        .request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED_BY_MEMBER");
    assert!(!cancelled["cancelled_at"].is_null());

    // The 1:1 session still owns its start instant, so the slot is not
    // re-offered after the member cancels.
    let (_, slots) = app
        .request(
            "GET",
            &format!("/api/v1/slots?start={}&end={}&coach_id={}", monday, monday, coach_id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(slots.as_array().unwrap().len(), 2);

    // Cancelling twice is rejected.
    let (status, _) = app
        .request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_member_cannot_cancel_foreign_booking() {
    let app = TestApp::new().await;
    let (coach_id, _) = setup_monday_coach(&app).await;
    app.create_member("bob").await;
    app.create_member("carla").await;
    let bob = app.login("bob").await;
    let carla = app.login("carla").await;

    let monday = fmt_date(next_weekday(1));
    let (_, booking) = app
        .request(
            "POST",
            "/api/v1/bookings",
            Some(&bob),
            Some(json!({ "coach_id": coach_id, "date": monday, "time": "09:00" })),
        )
        .await;
    let booking_id = booking["id"].as_str().unwrap();

    let (status, _) = app
        .request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(&carla), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_coach_cancel_session_cascades_to_bookings() {
    let app = TestApp::new().await;
    let (coach_id, coach_auth) = setup_monday_coach(&app).await;
    app.create_member("bob").await;
    let bob = app.login("bob").await;

    let monday = fmt_date(next_weekday(1));
    let (_, booking) = app
        .request(
            "POST",
            "/api/v1/bookings",
            Some(&bob),
            Some(json!({ "coach_id": coach_id, "date": monday, "time": "11:00" })),
        )
        .await;
    let session_id = booking["session_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/sessions/{}/cancel", session_id),
            Some(&coach_auth),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bookings) = app.request("GET", "/api/v1/bookings", Some(&bob), None).await;
    let bookings = bookings.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["status"], "CANCELLED_BY_COACH");

    // Cancelled sessions are filtered from the default session list.
    let (_, sessions) = app
        .request(
            "GET",
            &format!("/api/v1/sessions?start={}&end={}&coach_id={}", monday, monday, coach_id),
            Some(&bob),
            None,
        )
        .await;
    assert!(sessions.as_array().unwrap().is_empty());

    let (_, sessions) = app
        .request(
            "GET",
            &format!(
                "/api/v1/sessions?start={}&end={}&coach_id={}&include_cancelled=true",
                monday, monday, coach_id
            ),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(sessions.as_array().unwrap()[0]["status"], "cancelled");
}
