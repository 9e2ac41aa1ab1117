use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use coaching_backend::{
    api::router::create_router,
    config::Config,
    domain::models::room::{CoachProfile, Room},
    domain::models::user::{User, ROLE_ADMIN, ROLE_COACH, ROLE_MEMBER},
    infra::factory::{build_state, run_migrations},
    state::AppState,
};
use rand::rngs::OsRng;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "training-time-123";

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_migrations(&pool).await;

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            generation_weeks_ahead: 6,
            generation_interval_secs: 3600,
        };

        // The periodic worker is deliberately not spawned: generation runs
        // only through the admin trigger so tests control every run.
        let state = Arc::new(build_state(&config, pool.clone()));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn create_user(&self, username: &str, display_name: &str, role: &str) -> User {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(TEST_PASSWORD.as_bytes(), &salt)
            .unwrap()
            .to_string();

        let user = User::new(username.to_string(), display_name.to_string(), password_hash, role);
        self.state.user_repo.create(&user).await.unwrap()
    }

    pub async fn create_coach(&self, username: &str) -> User {
        self.create_user(username, username, ROLE_COACH).await
    }

    pub async fn create_member(&self, username: &str) -> User {
        self.create_user(username, username, ROLE_MEMBER).await
    }

    pub async fn create_admin(&self, username: &str) -> User {
        self.create_user(username, username, ROLE_ADMIN).await
    }

    /// Room plus a coach profile pointing at it as the default.
    pub async fn setup_coach_room(&self, coach_id: &str) -> Room {
        let room = self
            .state
            .room_repo
            .create(&Room::new("Main studio".into(), 12))
            .await
            .unwrap();
        self.state
            .profile_repo
            .upsert(&CoachProfile::new(coach_id.to_string(), Some(room.id.clone())))
            .await
            .unwrap();
        room
    }

    pub async fn login(&self, username: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "username": username,
            "password": TEST_PASSWORD
        });

        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies
            .iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..]
            .find(';')
            .unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start + end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"]
            .as_str()
            .expect("No csrf_token in body")
            .to_string();

        AuthHeaders {
            access_token,
            csrf_token,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// Next date with the given weekday (0 = Sunday), strictly after today so
/// every slot of that day is still in the future.
#[allow(dead_code)]
pub fn next_weekday(weekday: u32) -> NaiveDate {
    let mut date = Local::now().date_naive() + Duration::days(1);
    while date.weekday().num_days_from_sunday() != weekday {
        date += Duration::days(1);
    }
    date
}

#[allow(dead_code)]
pub fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
