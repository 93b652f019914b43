use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gacha_server::{app, db, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    db::init_db(&db).await?;

    let catalog = db::load_catalog(&db).await?;
    match catalog.validate() {
        Ok(warnings) => {
            for w in warnings {
                tracing::warn!(?w, "pattern catalog warning");
            }
        }
        Err(e) => tracing::warn!(error = %e, "pattern catalog is not drawable yet"),
    }

    let addr = config.bind.clone();
    let state = Arc::new(AppState { db, config });
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
