//! Route table for the REST API.
//!
//! ```text
//! /api/auth/*        signup, login, refresh, email confirmation
//! /api/users/*       current profile and avatar (rate limited)
//! /api/contacts/*    contact CRUD, search, birthdays (rate limited)
//! /api/healthchecker database round trip
//! /health/{ready,live}
//! ```
//!
//! Shared by the server binary and the integration tests so both exercise
//! the same table. Handler state (`HttpState`, `HealthState`) is supplied by
//! the caller.

use actix_web::web;

use crate::inbound::http::validation::{json_config, path_config, query_config};
use crate::inbound::http::{accounts, contacts, health, users};
use crate::middleware::RateLimit;

/// Register every API scope, wrapping the authenticated scopes in `limit`.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use actix_web::App;
/// use contacts_backend::domain::ports::RateLimiter;
/// use contacts_backend::inbound::http::routes::api;
/// use contacts_backend::middleware::{RateLimit, RateLimitPolicy};
///
/// fn app(limiter: Arc<dyn RateLimiter>) {
///     let limit = RateLimit::new(limiter, RateLimitPolicy::new(5, Duration::from_secs(10)));
///     let _app = App::new().configure(api(limit));
/// }
/// ```
pub fn api(limit: RateLimit) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .service(
                web::scope("/api/auth")
                    .service(accounts::signup)
                    .service(accounts::login)
                    .service(accounts::refresh_token)
                    .service(accounts::confirmed_email)
                    .service(accounts::request_email),
            )
            .service(
                web::scope("/api/users")
                    .wrap(limit.clone())
                    .service(users::me)
                    .service(users::update_avatar),
            )
            .service(
                web::scope("/api/contacts")
                    .wrap(limit)
                    .configure(contacts::configure),
            )
            .service(health::healthchecker)
            .service(health::ready)
            .service(health::live);
    }
}
