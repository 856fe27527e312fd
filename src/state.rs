use std::sync::Arc;

use crate::{
    auth::{jwt::JwtKeys, password::PasswordHasher},
    config::AppConfig,
    db::Database,
    middleware::RateLimiter,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub hasher: PasswordHasher,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database_url, config.db_max_connections).await?;
        Self::from_parts(db, config)
    }

    pub fn from_parts(db: Database, config: AppConfig) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.hashing)?;
        let jwt = JwtKeys::new(&config.jwt);
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Ok(Self {
            db,
            config: Arc::new(config),
            jwt,
            hasher,
            limiter,
        })
    }
}
