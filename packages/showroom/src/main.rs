use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{Level, info};

use showroom::config::AppConfig;
use showroom::database::init_db;
use showroom::state::AppState;
use showroom::utils::hash::hash_password;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    // `showroom hash-password <password>` prints a value for `auth.admin_password_hash`.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [cmd, password] = args.as_slice()
        && cmd == "hash-password"
    {
        println!("{}", hash_password(password)?);
        return Ok(());
    }

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    let blob_store = common::storage::open_blob_store(&config.storage)
        .await
        .context("Failed to open blob store")?;
    info!(backend = ?config.storage.backend, "Blob store ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        blob_store,
        config: Arc::new(config),
    };
    let app = showroom::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
