use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{Local, NaiveDateTime};
use sqlx::FromRow;

pub const ROLE_COACH: &str = "COACH";
pub const ROLE_MEMBER: &str = "MEMBER";
pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn new(username: String, display_name: String, password_hash: String, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            display_name,
            password_hash,
            role: role.to_string(),
            created_at: Local::now().naive_local(),
        }
    }
}
