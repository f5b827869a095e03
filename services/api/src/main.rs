use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod routes;
mod settings;
mod state;

use auth::{AuthManager, JwtConfig, repositories::PgUserRepository};
use booking::{
    AvailabilityConfig, AvailabilityResolver, BookingManager,
    provider::{AmadeusClient, AmadeusConfig, DisabledProvider, InventoryProvider},
    repositories::PgBookingRepository,
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool, run_migrations},
};
use tokio::net::TcpListener;

use crate::{settings::Settings, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting booking API service");

    let settings = Settings::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let redis = RedisPool::new(&RedisConfig::from_env()?).await?;
    match redis.health_check().await {
        Ok(true) => info!("Redis connection successful"),
        // Availability still works without a cache, just uncached
        _ => warn!("Redis is not reachable, availability will not be cached"),
    }

    let provider: Arc<dyn InventoryProvider> = match AmadeusConfig::from_env() {
        Ok(config) => Arc::new(AmadeusClient::new(config)?),
        Err(e) => {
            warn!("Inventory provider disabled: {}", e);
            Arc::new(DisabledProvider)
        }
    };

    let auth = AuthManager::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        JwtConfig::from_env()?,
    );

    let resolver = Arc::new(AvailabilityResolver::new(
        Arc::new(redis),
        provider,
        AvailabilityConfig::from(&settings.availability),
    ));
    let bookings = BookingManager::new(resolver, Arc::new(PgBookingRepository::new(pool)))
        .with_default_currency(settings.availability.fallback_currency.clone());

    let app_state = AppState::new(auth, bookings);

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
