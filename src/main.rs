use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use agora_chat::chat::delivery::BestEffortDelivery;
use agora_chat::config::{generate_config_template, Config};
use agora_chat::db;
use agora_chat::routes;
use agora_chat::state::AppState;
use agora_chat::storage::DiskStorage;
use agora_chat::store::SqliteStore;
use agora_chat::ws::registry::ConnectionRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "agora_chat=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "agora_chat=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("agora-chat v{} starting", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite database and the uploads directory
    let db = db::init_db(&config.data_dir)?;
    let uploads = DiskStorage::new(&config.data_dir)?;

    // Build application state with the default collaborators
    let state = AppState {
        store: Arc::new(SqliteStore::new(db)),
        registry: Arc::new(ConnectionRegistry::new()),
        delivery: Arc::new(BestEffortDelivery),
        uploads: Arc::new(uploads),
    };

    // Build router
    let app = routes::build_router(state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
