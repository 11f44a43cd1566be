use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::app::{app, AppState};
use crate::auth::Argon2Hasher;
use crate::config::config;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "contact-directory")]
#[command(about = "Per-user contact directory API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen port, overrides CONTACT_API_PORT")]
        port: Option<u16>,

        #[arg(long, help = "Keep data in process memory instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Create database tables and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => serve(port, memory).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config().database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
    }
}

async fn serve(port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    let cfg = config();
    tracing::info!("Starting contact directory in {:?} mode", cfg.environment);

    let store: Arc<dyn Store> = if memory {
        if crate::is_production!() {
            tracing::warn!("Running with the in-memory store in production; data is lost on restart");
        }
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&cfg.database).await?;
        DatabaseManager::migrate(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    let state = AppState::new(store, Arc::new(Argon2Hasher::new()));

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(cfg.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
