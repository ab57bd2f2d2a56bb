use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kv_admin_api::config::AppConfig;
use kv_admin_api::services::bootstrap;
use kv_admin_api::store::{MemoryStore, StoreHandle};
use kv_admin_api::{app, AppState};

#[derive(Parser)]
#[command(name = "kv-admin-api")]
#[command(about = "Admin console backend over a schema-flexible key-value store")]
#[command(version)]
struct Args {
    #[arg(long, env = "SERVER_HOST", help = "Address to bind")]
    host: Option<String>,

    #[arg(long, short, env = "SERVER_PORT", help = "Port to listen on")]
    port: Option<u16>,

    #[arg(long, env = "FIXTURE_PATH", help = "JSON fixture with tables and items to load at startup")]
    fixture: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so JWT_SECRET, ADMIN_PASSWORD etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let mut config: AppConfig = kv_admin_api::config::config().clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.fixture.is_some() {
        config.bootstrap.fixture_path = args.fixture;
    }
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    tracing::info!("Starting KV Admin API in {:?} mode", config.environment);

    let store: StoreHandle = Arc::new(MemoryStore::new());
    bootstrap::run(&store, &config.bootstrap, config.security.bcrypt_cost)
        .await
        .context("bootstrap failed")?;

    let app = app(AppState::new(store, &config), &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
