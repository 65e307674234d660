use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

mod app;
mod http;
mod store;
mod ws;

#[derive(Parser)]
#[command(name = "tipstream-gateway", about = "Donation alert relay gateway")]
struct Args {
    /// Path to tipstream.toml (default: ~/.tipstream/tipstream.toml)
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tipstream_gateway=info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    // load config: explicit path > TIPSTREAM_CONFIG env > ~/.tipstream/tipstream.toml
    let config_path = args
        .config
        .or_else(|| std::env::var("TIPSTREAM_CONFIG").ok());
    let config = tipstream_core::config::TipstreamConfig::load(config_path.as_deref())
        .unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            tipstream_core::config::TipstreamConfig::default()
        });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // initialize SQLite database — single file for both subsystems
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    // run schema migrations (idempotent)
    tipstream_store::db::init_db(&db)?;
    info!("database migrations complete");

    // build subsystems — each gets its own connection for thread safety
    let identities = store::IdentityHandle::new(tipstream_store::IdentityStore::new(
        rusqlite::Connection::open(db_path)?,
    ));
    let queue = store::QueueHandle::new(tipstream_store::NotificationQueue::new(
        rusqlite::Connection::open(db_path)?,
    ));

    let state = Arc::new(app::AppState::new(config, identities, queue));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Tipstream gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
