mod app;
mod auth;
mod config;
mod db;
mod error;
mod extractors;
mod places;
mod products;
mod resources;
mod response;
mod state;
mod timefmt;

use crate::{
    config::{AppConfig, StoreKind},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "saas_api=debug,axum=info,tower_http=info".to_string());
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
    let state = match config.store {
        StoreKind::Postgres => {
            let pool = db::connect(&config.database).await?;
            db::migrate(&pool).await?;
            AppState::postgres(config, pool)
        }
        StoreKind::Memory => {
            tracing::warn!("APP_STORE=memory; data is lost on restart");
            AppState::in_memory(config)
        }
    };
    let config = state.config.clone();
    app::serve(app::build_app(state), &config).await
}
