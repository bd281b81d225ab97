//! Backend entry-point: loads settings, builds pools and serves the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use contacts_backend::AppSettings;
use contacts_backend::inbound::http::health::HealthState;
use contacts_backend::outbound::cache::RedisPool;
use contacts_backend::outbound::persistence::DbPool;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;
    let db_pool = DbPool::new(settings.pool_config())
        .await
        .wrap_err("failed to build database pool")?;
    let redis_pool =
        RedisPool::new(settings.redis_pool_config()).wrap_err("failed to build redis pool")?;
    let config = ServerConfig::from_settings(&settings, db_pool, redis_pool)
        .wrap_err("invalid configuration")?;
    info!(bind_addr = %config.bind_addr(), "starting contacts backend");

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await?;
    Ok(())
}
