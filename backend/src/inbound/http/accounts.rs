//! Account and token API handlers.
//!
//! ```text
//! POST /api/auth/signup {"username":"ada","email":"ada@example.com","password":"secret1"}
//! POST /api/auth/login username=ada%40example.com&password=secret1  (form or JSON)
//! GET /api/auth/refresh_token  (Authorization: Bearer <refresh token>)
//! GET /api/auth/confirmed_email/{token}
//! POST /api/auth/request_email {"email":"ada@example.com"}
//! ```

use std::sync::Arc;

use actix_web::{Either, HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::AuthCommand;
use crate::domain::{
    EmailAddress, EmailRequestOutcome, Error, LoginCredentials, SignupRequest, TokenPair,
    TraceId, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerToken;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_auth, invalid_value};

/// Signup request body for `POST /api/auth/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupPayload {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

/// Login request body for `POST /api/auth/login`.
///
/// Accepted as `application/x-www-form-urlencoded` (OAuth2 password form) or
/// JSON. The `username` field carries the account email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginPayload {
    #[schema(example = "ada@example.com")]
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/auth/request_email`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EmailPayload {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Absolute base URL of this service as seen by the caller.
fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}/", info.scheme(), info.host())
}

/// Mail a confirmation link without holding up the response.
///
/// Failures are logged; the client never sees them.
fn spawn_confirmation(auth: Arc<dyn AuthCommand>, profile: UserProfile, base_url: String) {
    let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
    actix_web::rt::spawn(TraceId::scope(trace_id, async move {
        if let Err(error) = auth.send_confirmation(&profile, &base_url).await {
            warn!(user_id = %profile.id, error = %error, "confirmation email not sent");
        }
    }));
}

/// Register a new account.
///
/// A confirmation email is sent in the background.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<SignupPayload>,
) -> ApiResult<HttpResponse> {
    let SignupPayload {
        username,
        email,
        password,
    } = payload.into_inner();
    let request =
        SignupRequest::try_from_parts(&username, &email, &password).map_err(invalid_auth)?;
    let profile = state.auth.signup(request).await?;
    spawn_confirmation(state.auth.clone(), profile.clone(), base_url(&req));
    Ok(HttpResponse::Created().json(profile))
}

/// Exchange email and password for a token pair.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(
        description = "OAuth2 password form; JSON is also accepted",
        content(
            (LoginPayload = "application/x-www-form-urlencoded"),
            (LoginPayload = "application/json")
        )
    ),
    responses(
        (status = 200, description = "Tokens issued", body = TokenPair),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: Either<web::Json<LoginPayload>, web::Form<LoginPayload>>,
) -> ApiResult<web::Json<TokenPair>> {
    let LoginPayload { username, password } = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let credentials = LoginCredentials::try_from_parts(&username, &password).map_err(|err| {
        // The email travels in the `username` field of the login form.
        let field = match err.field() {
            "email" => "username",
            other => other,
        };
        invalid_value(FieldName::new(field), err.to_string())
    })?;
    let tokens = state.auth.login(credentials).await?;
    Ok(web::Json(tokens))
}

/// Rotate the token pair using the refresh token in the bearer header.
#[utoipa::path(
    get,
    path = "/api/auth/refresh_token",
    responses(
        (status = 200, description = "Tokens rotated", body = TokenPair),
        (status = 401, description = "Invalid refresh token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "refreshToken",
    security(("bearer" = []))
)]
#[get("/refresh_token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<web::Json<TokenPair>> {
    let tokens = state.auth.refresh(token.as_str()).await?;
    Ok(web::Json(tokens))
}

/// Confirm the email address carried by a confirmation link.
#[utoipa::path(
    get,
    path = "/api/auth/confirmed_email/{token}",
    params(("token" = String, Path, description = "Email confirmation token")),
    responses(
        (status = 200, description = "Email confirmed", body = MessageResponse),
        (status = 400, description = "Invalid or unknown token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmEmail",
    security([])
)]
#[get("/confirmed_email/{token}")]
pub async fn confirmed_email(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let outcome = state.auth.confirm_email(&token.into_inner()).await?;
    Ok(web::Json(MessageResponse::new(outcome.message())))
}

/// Ask for a new confirmation email.
#[utoipa::path(
    post,
    path = "/api/auth/request_email",
    request_body = EmailPayload,
    responses(
        (status = 200, description = "Request handled", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestEmail",
    security([])
)]
#[post("/request_email")]
pub async fn request_email(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<EmailPayload>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = EmailAddress::parse(&payload.email)
        .map_err(|err| invalid_value(FieldName::new("email"), err.to_string()))?;
    let outcome = state.auth.request_confirmation(&email).await?;
    let message = outcome.message();
    if let EmailRequestOutcome::Send(profile) = outcome {
        spawn_confirmation(state.auth.clone(), profile, base_url(&req));
    }
    Ok(web::Json(MessageResponse::new(message)))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
