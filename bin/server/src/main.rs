use coffee_shop_access::{AccessGuard, AuthConfig, HttpKeySource, JwksCache};
use coffee_shop_server::{
    app::{self, AppState},
    config::ServerConfig,
    db::{DrinkStore, MemoryDrinkStore, PgDrinkStore},
    error::StartupError,
};
use rootcause::Report;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let store = open_store(&config)
        .await
        .expect("failed to open drink store");

    if config.reset_database {
        let seed = store
            .reset_with_seed()
            .await
            .expect("failed to reset drinks");
        tracing::warn!(seed = %seed.id, "Reset drinks to the seed drink");
    }

    let guard = build_guard(config.auth).expect("failed to set up token verification");

    let state = Arc::new(AppState::new(store, guard));
    let app = app::router(state, &config.cors).expect("failed to build router");

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn DrinkStore>, Report<StartupError>> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL is not set; drinks are kept in memory");
        return Ok(Arc::new(MemoryDrinkStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })?;

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })?;

    Ok(Arc::new(PgDrinkStore::new(pool)))
}

fn build_guard(auth: AuthConfig) -> Result<Arc<AccessGuard>, Report<StartupError>> {
    let source = HttpKeySource::from_config(&auth).map_err(|e| StartupError::KeySource {
        details: e.to_string(),
    })?;
    tracing::info!(url = source.url(), "Verifying tokens against published key set");

    let keys = Arc::new(JwksCache::from_config(Arc::new(source), &auth));
    Ok(Arc::new(AccessGuard::new(auth, keys)))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutting down");
}
