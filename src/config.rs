use std::str::FromStr;

/// Signing secret used when `JWT_SECRET` is not provided. Anyone reading this
/// source can forge tokens with it, so it is only fit for local demos.
pub const DEMO_JWT_SECRET: &str = "api-learning-demo-secret-2024";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

impl JwtConfig {
    pub fn uses_demo_secret(&self) -> bool {
        self.secret == DEMO_JWT_SECRET
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub hashing: HashConfig,
    pub environment: Environment,
    pub frontend_url: String,
    pub static_dir: String,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = HashConfig::default();
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://api_learning.db".into()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| DEMO_JWT_SECRET.into()),
                ttl_hours: env_or("JWT_TTL_HOURS", 24)?,
            },
            hashing: HashConfig {
                memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
                iterations: env_or("ARGON2_ITERATIONS", defaults.iterations)?,
                parallelism: env_or("ARGON2_PARALLELISM", defaults.parallelism)?,
            },
            environment,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "https://your-app-name.onrender.com".into()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "frontend".into()),
            rate_limit: RateLimitConfig {
                max_requests: env_or("RATE_LIMIT_MAX", 100)?,
                window_secs: env_or("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            },
        })
    }

    /// Origins allowed by CORS for the current environment.
    pub fn allowed_origins(&self) -> Vec<String> {
        match self.environment {
            Environment::Production => vec![self.frontend_url.clone()],
            Environment::Development => vec![
                "http://localhost:3000".into(),
                "http://127.0.0.1:3000".into(),
                "http://localhost:8080".into(),
            ],
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when unset.
/// A value that is set but unparsable is a startup error.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_when_unset() {
        let v: u32 = env_or("API_LEARNING_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn env_or_rejects_garbage() {
        std::env::set_var("API_LEARNING_TEST_GARBAGE", "twelve");
        let err = env_or::<u32>("API_LEARNING_TEST_GARBAGE", 1).unwrap_err();
        assert!(err.to_string().contains("API_LEARNING_TEST_GARBAGE"));
    }

    #[test]
    fn development_origins_are_local() {
        let mut cfg = crate::test_support::test_config();
        cfg.environment = Environment::Development;
        assert!(cfg
            .allowed_origins()
            .iter()
            .all(|o| o.contains("localhost") || o.contains("127.0.0.1")));

        cfg.environment = Environment::Production;
        cfg.frontend_url = "https://learn.example.com".into();
        assert_eq!(cfg.allowed_origins(), vec!["https://learn.example.com"]);
    }
}
