//! Bearer token extractors used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! header parsing and caller resolution here.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::{Error, UserProfile};

use super::state::HttpState;

const NOT_AUTHENTICATED: &str = "Not authenticated";
const BEARER_SCHEME: &str = "bearer";

/// Extract the credentials of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized(NOT_AUTHENTICATED))?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized(NOT_AUTHENTICATED))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return Err(Error::unauthorized(NOT_AUTHENTICATED));
    }
    Ok(token.to_owned())
}

fn handler_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

/// Raw bearer token, used where the token is not an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Borrow the token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromRequest for BearerToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(bearer_token(req).map(BearerToken).map_err(Into::into))
    }
}

/// Profile of the caller behind a valid access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(UserProfile);

impl AuthenticatedUser {
    /// Borrow the caller's profile.
    pub fn profile(&self) -> &UserProfile {
        &self.0
    }

    /// Take ownership of the caller's profile.
    pub fn into_profile(self) -> UserProfile {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = bearer_token(req).and_then(|token| Ok((token, handler_state(req)?)));
        Box::pin(async move {
            let (token, state) = resolved?;
            let profile = state.current_user.current_user(&token).await?;
            Ok(AuthenticatedUser(profile))
        })
    }
}
