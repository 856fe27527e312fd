//! In-process harness: a router over a private in-memory database, driven
//! with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::password::PasswordHasher,
    config::{
        AppConfig, Environment, HashConfig, JwtConfig, RateLimitConfig, DEMO_JWT_SECRET,
    },
    db::{seed::seed, Database},
    state::AppState,
};

/// Smallest argon2 cost the crate accepts; keeps the suite fast.
pub fn cheap_hashing() -> HashConfig {
    HashConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: DEMO_JWT_SECRET.into(),
            ttl_hours: 24,
        },
        hashing: cheap_hashing(),
        environment: Environment::Development,
        frontend_url: "http://localhost:3000".into(),
        static_dir: "frontend".into(),
        rate_limit: RateLimitConfig {
            max_requests: 10_000,
            window_secs: 60,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Schema only, no rows.
    pub async fn empty() -> Self {
        Self::with_config(test_config()).await
    }

    /// Schema plus the demonstration data.
    pub async fn seeded() -> Self {
        let app = Self::empty().await;
        let hasher = PasswordHasher::new(cheap_hashing()).unwrap();
        seed(&app.state.db, &hasher).await.unwrap();
        app
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        let state = AppState::from_parts(db, config).unwrap();
        Self {
            router: build_app(state.clone()),
            state,
        }
    }
}

/// Sends one request and decodes the JSON body (`Value::Null` when empty).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
