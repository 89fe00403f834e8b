//! School Visits Server
//!
//! REST API server for scheduling university visits to schools.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use school_visits_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{
        memory::{MemorySeed, MemoryStore},
        RecordStore, Repository,
    },
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("school_visits_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting School Visits Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Campaign {} to {}, {} visits per day",
        config.campaign.start_date,
        config.campaign.end_date,
        config.campaign.daily_cap
    );

    let store: Arc<dyn RecordStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            // Create database connection pool
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("./migrations").run(&pool).await?;

            tracing::info!("Database migrations completed");
            Arc::new(Repository::new(pool))
        }
        StorageBackend::Memory => {
            let store = match &config.storage.seed_path {
                Some(path) => MemoryStore::from_seed(MemorySeed::from_file(path)?),
                None => MemoryStore::new(),
            };
            tracing::warn!("Using the in-memory record store: data is lost on shutdown");
            Arc::new(store)
        }
    };

    // Save server address before moving config
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create services and application state
    let services = Services::new(store, &config);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
