//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppPorts, build_app_ports};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer, web};

use contacts_backend::Trace;
#[cfg(debug_assertions)]
use contacts_backend::doc::ApiDoc;
use contacts_backend::inbound::http::health::HealthState;
use contacts_backend::inbound::http::routes::api;
use contacts_backend::inbound::http::state::HttpState;
use contacts_backend::middleware::{AccessGuard, AccessRules, RateLimit, cors};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    access_rules: AccessRules,
    rate_limit: RateLimit,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        access_rules,
        rate_limit,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(cors())
        .wrap(AccessGuard::new(access_rules))
        .wrap(Trace)
        .wrap(NormalizePath::trim())
        .configure(api(rate_limit));

    // Paths arrive with trailing slashes trimmed, so `/docs/` lands on the
    // redirect and the UI assets resolve under `/docs/`.
    #[cfg(debug_assertions)]
    let app = app
        .service(web::redirect("/docs", "/docs/index.html"))
        .service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] holding pools, credentials and limits.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when an adapter cannot be built or binding
/// the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let AppPorts {
        http_state,
        rate_limiter,
    } = build_app_ports(&config)?;
    let rate_limit = RateLimit::new(rate_limiter, config.rate_limit);
    let bind_addr = config.bind_addr();
    let access_rules = config.access_rules;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            access_rules: access_rules.clone(),
            rate_limit: rate_limit.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
