//! Fixed-window rate limiting keyed by peer address and path.
//!
//! The counter for `rate:<peer ip>:<path>` starts with the first hit and
//! expires after the window. Requests beyond the allowance receive `429`.
//! When the counter store is unreachable the request is let through and a
//! warning is logged.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::domain::Error as DomainError;
use crate::domain::ports::RateLimiter;

const TOO_MANY_REQUESTS: &str = "Too many requests";
const RATE_KEY_PREFIX: &str = "rate";

/// Allowance per key and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u64,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// `max_requests` hits per `window`.
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

fn counter_key(req: &ServiceRequest) -> String {
    let peer = req
        .peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string());
    format!("{RATE_KEY_PREFIX}:{peer}:{}", req.path())
}

/// Middleware enforcing a [`RateLimitPolicy`] through a [`RateLimiter`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use actix_web::{App, web};
/// use contacts_backend::domain::ports::RateLimiter;
/// use contacts_backend::middleware::{RateLimit, RateLimitPolicy};
///
/// fn contacts_scope(limiter: Arc<dyn RateLimiter>) {
///     let limit = RateLimit::new(limiter, RateLimitPolicy::new(5, Duration::from_secs(10)));
///     let _app = App::new().service(web::scope("/api/contacts").wrap(limit));
/// }
/// ```
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<dyn RateLimiter>,
    policy: RateLimitPolicy,
}

impl RateLimit {
    pub fn new(limiter: Arc<dyn RateLimiter>, policy: RateLimitPolicy) -> Self {
        Self { limiter, policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
            policy: self.policy,
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    policy: RateLimitPolicy,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = Arc::clone(&self.limiter);
        let policy = self.policy;
        Box::pin(async move {
            let key = counter_key(&req);
            match limiter.hit(&key, policy.window).await {
                Ok(count) if count > policy.max_requests => {
                    debug!(%key, count, "rate limit exceeded");
                    return Ok(req
                        .error_response(DomainError::too_many_requests(TOO_MANY_REQUESTS))
                        .map_into_right_body());
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(%key, %error, "rate limiter unavailable; allowing request");
                }
            }
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}
