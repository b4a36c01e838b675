use anyhow::Context;
use dotenvy::dotenv;
use sea_orm::Database;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cuartorojo::app::{build_router, cors_layer, AppState};
use cuartorojo::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cuartorojo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    info!("🚀 Starting Cuarto Rojo API in {} environment", config.environment);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    info!("Database connected successfully");

    let state = AppState::build(&config, db)
        .await
        .context("failed to initialise application state")?;
    let app = build_router(state, cors_layer(&config.cors_origins));

    // Start server
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("🚀 Server starting on http://{}", addr);
    info!("📊 GraphQL Playground available at http://{}/playground", addr);
    info!("🏥 Health check available at http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
