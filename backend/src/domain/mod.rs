//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities used by the API and persistence
//! layers, plus the services implementing the driving ports. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User / UserProfile: account record and its secret-free projection.
//! - Contact: address-book entry scoped to one owner.
//! - AuthService, CurrentUserService, ProfileService, ContactsService:
//!   implementations of the driving ports in [`ports`].

pub mod auth;
mod auth_service;
pub mod contact;
mod contacts_service;
mod current_user;
pub mod email;
pub mod error;
pub mod ports;
mod profile_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AuthValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, SignupRequest, TokenPair,
    TokenScope,
};
pub use self::auth_service::{AuthService, ConfirmEmailOutcome, EmailRequestOutcome};
pub use self::contact::{
    BIRTHDAY_WINDOW_DAYS, CONTACT_EMAIL_MAX, Contact, ContactDraft, ContactFields, ContactId,
    ContactPatch, ContactValidationError, MonthDay, NAME_MAX, NOTES_MAX, PAGE_LIMIT_DEFAULT,
    PAGE_LIMIT_MAX, PAGE_LIMIT_MIN, PHONE_MAX, Pagination, SEARCH_TERM_MAX, SEARCH_TERM_MIN,
    SearchTerm, birthday_window,
};
pub use self::contacts_service::ContactsService;
pub use self::current_user::{CurrentUserService, jittered_ttl};
pub use self::email::{EMAIL_MAX, EmailAddress, EmailValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::profile_service::ProfileService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    NewUser, Role, USER_EMAIL_MAX, USERNAME_MAX, USERNAME_MIN, User, UserId, UserProfile,
    UserValidationError, Username, gravatar_url,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use contacts_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
