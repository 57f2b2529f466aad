//! Flight search aggregator server.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flight_search::cache::{Cache, CacheService};
use flight_search::config::Config;
use flight_search::coordinator::Coordinator;
use flight_search::fetcher::Fetcher;
use flight_search::http::{create_router, AppState};
use flight_search::limiter::AdmissionLimiter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_search=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::load().context("failed to load configuration")?;
    tracing::info!(app_name = %config.app_name, app_env = %config.app_env, "starting flight-search");

    let redis_client = redis::Client::open(config.redis_url()).context("invalid redis url")?;
    let redis_conn = ConnectionManager::new(redis_client).await.context("failed to connect to redis")?;

    let cache: Arc<dyn Cache> = Arc::new(CacheService::new(redis_conn.clone(), config.cache_ttl.as_secs()));
    let limiter =
        AdmissionLimiter::new(redis_conn, config.request_limiter_ttl.as_secs(), config.request_limiter_max);
    let fetcher = Fetcher::new(config.clone());
    let coordinator = Coordinator::new(cache, fetcher);

    let state = Arc::new(AppState { coordinator, limiter });
    let router = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await.context("failed to bind listener")?;
    tracing::info!(addr, "listening");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
