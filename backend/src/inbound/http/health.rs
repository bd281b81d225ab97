//! Health endpoints: liveness & readiness probes for orchestration and load
//! balancers, plus the database-backed health checker.
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::error;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::MessageResponse;
use crate::inbound::http::state::HttpState;

/// Greeting returned while the database answers queries.
pub const WELCOME_MESSAGE: &str = "Welcome to the contacts API!";

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. 200 once the server accepts traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Confirm the database answers a trivial query.
#[utoipa::path(
    get,
    path = "/api/healthchecker",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Database reachable", body = MessageResponse),
        (status = 500, description = "Database unreachable", body = Error)
    )
)]
#[get("/api/healthchecker")]
pub async fn healthchecker(state: web::Data<HttpState>) -> ApiResult<web::Json<MessageResponse>> {
    state.database.ping().await.map_err(|err| {
        error!(error = %err, "health check query failed");
        Error::internal("Error connecting to the database")
    })?;
    Ok(web::Json(MessageResponse::new(WELCOME_MESSAGE)))
}
