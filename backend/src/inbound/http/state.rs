//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthCommand, ContactsCommand, ContactsQuery, CurrentUserQuery, DatabaseProbe, ProfileCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthCommand>,
    pub current_user: Arc<dyn CurrentUserQuery>,
    pub profile: Arc<dyn ProfileCommand>,
    pub contacts: Arc<dyn ContactsCommand>,
    pub contacts_query: Arc<dyn ContactsQuery>,
    pub database: Arc<dyn DatabaseProbe>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub current_user: Arc<dyn CurrentUserQuery>,
    pub profile: Arc<dyn ProfileCommand>,
    pub contacts: Arc<dyn ContactsCommand>,
    pub contacts_query: Arc<dyn ContactsQuery>,
    pub database: Arc<dyn DatabaseProbe>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use contacts_backend::domain::ports::{
    ///     AuthCommand, ContactsCommand, ContactsQuery, CurrentUserQuery, FixtureDatabaseProbe,
    ///     ProfileCommand,
    /// };
    /// use contacts_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn build(
    ///     auth: Arc<dyn AuthCommand>,
    ///     current_user: Arc<dyn CurrentUserQuery>,
    ///     profile: Arc<dyn ProfileCommand>,
    ///     contacts: Arc<dyn ContactsCommand>,
    ///     contacts_query: Arc<dyn ContactsQuery>,
    /// ) -> HttpState {
    ///     HttpState::new(HttpStatePorts {
    ///         auth,
    ///         current_user,
    ///         profile,
    ///         contacts,
    ///         contacts_query,
    ///         database: Arc::new(FixtureDatabaseProbe),
    ///     })
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            auth,
            current_user,
            profile,
            contacts,
            contacts_query,
            database,
        } = ports;
        Self {
            auth,
            current_user,
            profile,
            contacts,
            contacts_query,
            database,
        }
    }
}
