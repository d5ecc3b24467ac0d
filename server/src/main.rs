//! Voyago API server.
//!
//! Run from repo root: `cargo run -p voyago-server`

use tokio::net::TcpListener;
use voyago_api::{apply_migrations, app_router, ensure_database_exists, marketplace_model, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("voyago_api=info,voyago_server=info")),
        )
        .init();

    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    let model = marketplace_model(&config.database_schema);
    apply_migrations(&pool, &model).await?;

    let addr = format!("0.0.0.0:{}", config.port);
    let env = config.env;
    let app = app_router(AppState::new(pool, model, config));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(?env, "Voyago API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
