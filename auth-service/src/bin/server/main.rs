use std::sync::Arc;

use anyhow::Context;
use auth_service::config::Config;
use auth_service::config::StoreBackend;
use auth_service::config::StoreConfig;
use auth_service::domain::auth::engine::AuthEngine;
use auth_service::domain::auth::ports::Store;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryStore;
use auth_service::outbound::repositories::PostgresStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let options = config.auth_options()?;

    tracing::info!(
        run_mode = %config.run_mode,
        http_port = config.server.http_port,
        store = ?config.store.backend,
        token_field = %options.token_field,
        min_password_length = options.min_password_length,
        cache_expires_in_ms = options.cache_expires_in.as_millis(),
        "Configuration loaded"
    );

    let store = connect_store(&config.store).await?;
    let engine = Arc::new(AuthEngine::new(options));

    let sweep_every = engine.cache().ttl();
    let sweeper = Arc::clone(&engine);
    // tokio::time::interval panics on a zero period.
    if sweep_every.is_zero() {
        tracing::warn!("Token cache TTL is zero, expired entries will not be swept");
    } else {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_every);
            loop {
                interval.tick().await;
                let evicted = sweeper.cache().evict_expired();
                if evicted > 0 {
                    tracing::debug!(evicted, "Expired token cache entries evicted");
                }
            }
        });
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(engine, store);
    match axum::serve(http_listener, http_application).await {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(())
}

async fn connect_store(config: &StoreConfig) -> Result<Store, anyhow::Error> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!(store = "memory", "Accounts and tokens are lost on restart");
            Ok(Store::from_backend(Arc::new(InMemoryStore::new())))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("store.database_url is required for the postgres backend")?;

            let pg_pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            tracing::info!(
                max_connections = config.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Ok(Store::from_backend(Arc::new(PostgresStore::new(pg_pool))))
        }
    }
}
