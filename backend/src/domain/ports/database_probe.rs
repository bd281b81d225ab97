//! Port used by the health checker to confirm the database answers queries.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when probing the database.
    pub enum DatabaseProbeError {
        /// No connection could be checked out.
        Connection { message: String } => "database probe connection failed: {message}",
        /// The probe query failed or returned nothing.
        Query { message: String } => "database probe query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Run a trivial query against the database.
    async fn ping(&self) -> Result<(), DatabaseProbeError>;
}

/// Probe that always succeeds; used when no database is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDatabaseProbe;

#[async_trait]
impl DatabaseProbe for FixtureDatabaseProbe {
    async fn ping(&self) -> Result<(), DatabaseProbeError> {
        Ok(())
    }
}
