use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub generation_weeks_ahead: i64,
    pub generation_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            generation_weeks_ahead: env::var("GENERATION_WEEKS_AHEAD")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("GENERATION_WEEKS_AHEAD must be a number"),
            generation_interval_secs: env::var("GENERATION_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("GENERATION_INTERVAL_SECS must be a number"),
        }
    }
}
