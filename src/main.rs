mod app;
mod auth;
mod config;
mod db;
mod envelope;
mod error;
mod extract;
mod middleware;
mod products;
mod state;
#[cfg(test)]
mod test_support;
mod tutorials;
mod users;
mod validate;

use crate::{config::AppConfig, db::seed::seed, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "api_learning=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.jwt.uses_demo_secret() {
        tracing::warn!("JWT_SECRET not set; signing tokens with the public demo secret");
    }

    let app_state = AppState::init(config).await?;
    app_state.db.init_schema().await?;
    seed(&app_state.db, &app_state.hasher).await?;

    tracing::info!(
        static_dir = %app_state.config.static_dir,
        "api learning platform ready"
    );
    app::serve(app::build_app(app_state)).await
}
