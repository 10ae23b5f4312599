use clap::{Parser, Subcommand};

use crate::config::{config, AppConfig, SecurityConfig};
use crate::database::{open_store, DatabaseManager};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "stay-finder")]
#[command(about = "Stay Finder - rental listing API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides STAY_FINDER_PORT / PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Create the Postgres tables and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config().clone(), port).await,
        Commands::Migrate => migrate(config()).await,
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    require_jwt_secret(&config.security)?;
    if crate::is_production!() && config.database.url.is_none() {
        tracing::warn!("Running in production without DATABASE_URL; listings will not survive a restart");
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Stay Finder API in {:?} mode", config.environment);

    let store = open_store(&config.database).await?;
    let state = AppState::new(store, config);
    state.uploads().ensure_root().await?;

    let bind_addr = format!("0.0.0.0:{}", state.config().server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Listening on http://{} ({})", bind_addr, state.store().backend());
    axum::serve(listener, crate::routes::app(state)).await?;
    Ok(())
}

/// Every environment needs a signing secret, otherwise signup and login fail
fn require_jwt_secret(security: &SecurityConfig) -> anyhow::Result<()> {
    if security.jwt_secret.trim().is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set to run migrations");
    }
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    println!("Database schema is up to date");
    Ok(())
}
