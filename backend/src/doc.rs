//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, users,
//!   contacts, health)
//! - **Schemas**: domain types and request payloads
//! - **Security**: bearer token authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{Contact, ContactId, Error, ErrorCode, Role, TokenPair, UserId, UserProfile, Username};
use crate::inbound::http::accounts::{EmailPayload, LoginPayload, MessageResponse, SignupPayload};
use crate::inbound::http::contacts::ContactPayload;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "bearer";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/auth/login; refresh token for GET /api/auth/refresh_token.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Contacts backend API",
        description = "Per-user address book with token authentication, email confirmation and avatar uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::refresh_token,
        crate::inbound::http::accounts::confirmed_email,
        crate::inbound::http::accounts::request_email,
        crate::inbound::http::users::me,
        crate::inbound::http::users::update_avatar,
        crate::inbound::http::contacts::create_contact,
        crate::inbound::http::contacts::list_contacts,
        crate::inbound::http::contacts::search_contacts,
        crate::inbound::http::contacts::upcoming_birthdays,
        crate::inbound::http::contacts::get_contact,
        crate::inbound::http::contacts::update_contact,
        crate::inbound::http::contacts::delete_contact,
        crate::inbound::http::health::healthchecker,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserProfile,
        UserId,
        Username,
        Role,
        TokenPair,
        Contact,
        ContactId,
        SignupPayload,
        LoginPayload,
        EmailPayload,
        MessageResponse,
        ContactPayload,
    )),
    tags(
        (name = "auth", description = "Signup, login, token refresh and email confirmation"),
        (name = "users", description = "The authenticated user's profile"),
        (name = "contacts", description = "The authenticated user's contacts"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
