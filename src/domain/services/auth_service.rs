use crate::config::Config;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::User;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, DecodingKey, EncodingKey, Header};
use rand::{distributions::Alphanumeric, Rng};

const ACCESS_TOKEN_TTL_HOURS: i64 = 12;

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Issues `(access_token, csrf_token)`. The CSRF token is bound into
    /// the claims; mutating requests must echo it in `X-CSRF-Token`.
    pub fn issue_tokens(&self, user: &User) -> Result<(String, String), AppError> {
        let csrf_token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role.clone(),
            csrf_token: csrf_token.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(ACCESS_TOKEN_TTL_HOURS)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal)?;
        Ok((token, csrf_token))
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}
