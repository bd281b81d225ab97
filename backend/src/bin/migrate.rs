//! Apply pending Diesel migrations to the configured database.
//!
//! The server never migrates on startup; run this binary during deployment.

use color_eyre::eyre::{Result, WrapErr, eyre};
use contacts_backend::AppSettings;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;
    let mut conn = PgConnection::establish(settings.database_url())
        .wrap_err("failed to connect to the database")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to apply migrations: {e}"))?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    info!(count = applied.len(), "database schema is up to date");
    Ok(())
}
