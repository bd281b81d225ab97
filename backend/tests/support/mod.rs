//! Shared harness for HTTP integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`. This
//! module builds the full application (route table, CORS, access guard,
//! trace, path normalisation and rate limiting) over the in-memory adapters exported by the `test-support`
//! feature, plus a few request helpers.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::middleware::NormalizePath;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{TimeZone, Utc};
use contacts_backend::Trace;
use contacts_backend::domain::ports::FixtureDatabaseProbe;
use contacts_backend::domain::{
    AuthService, ContactsService, CurrentUserService, ProfileService, TokenPair,
};
use contacts_backend::inbound::http::health::HealthState;
use contacts_backend::inbound::http::routes::api;
use contacts_backend::inbound::http::state::{HttpState, HttpStatePorts};
use contacts_backend::middleware::{
    AccessGuard, AccessRules, RateLimit, RateLimitPolicy, cors,
};
use contacts_backend::outbound::security::{JwtTokenService, TokenLifetimes};
use contacts_backend::test_support::{
    InMemoryContactRepository, InMemoryRateLimiter, InMemoryUserCache, InMemoryUserRepository,
    InsecureTestHasher, MutableClock, RecordingMailer, SentConfirmation, StubAvatarStore,
};
use jsonwebtoken::Algorithm;
use serde_json::{Value, json};
use zeroize::Zeroizing;

pub const PASSWORD: &str = "s3cret-pass";
const CACHE_TTL: Duration = Duration::from_secs(600);

/// In-memory application plus handles on every adapter it uses.
pub struct TestApp {
    pub users: Arc<InMemoryUserRepository>,
    pub contacts: Arc<InMemoryContactRepository>,
    pub cache: Arc<InMemoryUserCache>,
    pub limiter: Arc<InMemoryRateLimiter>,
    pub mailer: Arc<RecordingMailer>,
    pub avatars: Arc<StubAvatarStore>,
    pub clock: Arc<MutableClock>,
    state: web::Data<HttpState>,
    rules: AccessRules,
    policy: RateLimitPolicy,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Application pinned to 2024-12-28 12:00 UTC with a generous rate limit.
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 12, 28, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        ));
        let users = Arc::new(InMemoryUserRepository::default());
        let contacts = Arc::new(InMemoryContactRepository::default());
        let cache = Arc::new(InMemoryUserCache::default());
        let mailer = Arc::new(RecordingMailer::default());
        let avatars = Arc::new(StubAvatarStore::default());
        let tokens = Arc::new(JwtTokenService::new(
            Zeroizing::new("integration-secret".to_owned()),
            Algorithm::HS256,
            TokenLifetimes::default(),
            clock.clone(),
        ));

        let contacts_service = Arc::new(ContactsService::new(contacts.clone(), clock.clone()));
        let state = HttpState::new(HttpStatePorts {
            auth: Arc::new(AuthService::new(
                users.clone(),
                cache.clone(),
                tokens.clone(),
                Arc::new(InsecureTestHasher),
                mailer.clone(),
            )),
            current_user: Arc::new(CurrentUserService::new(
                users.clone(),
                cache.clone(),
                tokens,
                CACHE_TTL,
            )),
            profile: Arc::new(ProfileService::new(
                users.clone(),
                cache.clone(),
                avatars.clone(),
                CACHE_TTL,
            )),
            contacts: contacts_service.clone(),
            contacts_query: contacts_service,
            database: Arc::new(FixtureDatabaseProbe),
        });

        Self {
            users,
            contacts,
            cache,
            limiter: Arc::new(InMemoryRateLimiter::default()),
            mailer,
            avatars,
            clock,
            state: web::Data::new(state),
            rules: AccessRules::default(),
            policy: RateLimitPolicy::new(1_000, Duration::from_secs(60)),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: AccessRules) -> Self {
        self.rules = rules;
        self
    }

    /// Initialise the service exactly as the server assembles it.
    pub async fn service(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        test::init_service(
            App::new()
                .app_data(health)
                .app_data(self.state.clone())
                .wrap(cors())
                .wrap(AccessGuard::new(self.rules.clone()))
                .wrap(Trace)
                .wrap(NormalizePath::trim())
                .configure(api(RateLimit::new(self.limiter.clone(), self.policy))),
        )
        .await
    }

    /// Wait for the background task to deliver `count` confirmation emails.
    pub async fn confirmations(&self, count: usize) -> Vec<SentConfirmation> {
        for _ in 0..100 {
            let sent = self.mailer.sent();
            if sent.len() >= count {
                return sent;
            }
            actix_rt::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {count} confirmation emails, got {}", self.mailer.sent().len());
    }
}

/// Status, headers, JSON body (or `null`) and trace id header of one call.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub trace_id: Option<String>,
}

impl Reply {
    /// Header value as text, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub async fn call<S, B>(app: &S, req: TestRequest) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let trace_id = res
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply {
        status,
        headers,
        body,
        trace_id,
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

pub fn email_for(username: &str) -> String {
    format!("{username}@example.com")
}

/// Sign up, follow the emailed confirmation link and log in.
pub async fn register<S, B>(harness: &TestApp, app: &S, username: &str) -> TokenPair
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let already_sent = harness.mailer.sent().len();
    let signup = call(
        app,
        TestRequest::post().uri("/api/auth/signup").set_json(json!({
            "username": username,
            "email": email_for(username),
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(signup.status, StatusCode::CREATED, "{}", signup.body);

    let sent = harness.confirmations(already_sent + 1).await;
    let mail = sent.last().expect("confirmation email");
    let confirm = call(
        app,
        TestRequest::get().uri(&format!("/api/auth/confirmed_email/{}", mail.token())),
    )
    .await;
    assert_eq!(confirm.status, StatusCode::OK, "{}", confirm.body);

    let email = email_for(username);
    let login = call(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_form([("username", email.as_str()), ("password", PASSWORD)]),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK, "{}", login.body);
    serde_json::from_value(login.body).expect("token pair")
}
