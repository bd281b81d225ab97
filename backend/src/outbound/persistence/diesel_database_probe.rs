//! `SELECT 1` probe backing the `/api/healthchecker` endpoint.

use async_trait::async_trait;
use diesel::sql_types::Integer;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DatabaseProbe, DatabaseProbeError};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::pool::DbPool;

#[derive(diesel::QueryableByName)]
struct ProbeRow {
    #[diesel(sql_type = Integer)]
    alive: i32,
}

/// Checks out a pooled connection and runs a trivial query.
#[derive(Clone)]
pub struct DieselDatabaseProbe {
    pool: DbPool,
}

impl DieselDatabaseProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseProbe for DieselDatabaseProbe {
    async fn ping(&self) -> Result<(), DatabaseProbeError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DatabaseProbeError::connection(err.into_message()))?;

        let rows: Vec<ProbeRow> = diesel::sql_query("SELECT 1 AS alive")
            .load(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::Connection(message) => DatabaseProbeError::connection(message),
                DieselFailure::UniqueViolation => DatabaseProbeError::query("unexpected conflict"),
                DieselFailure::Query(message) => DatabaseProbeError::query(message),
            })?;

        match rows.as_slice().first() {
            Some(row) if row.alive == 1 => Ok(()),
            _ => Err(DatabaseProbeError::query("probe returned no rows")),
        }
    }
}
