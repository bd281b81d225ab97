//! Middleware rejecting banned peers before any handler runs.
//!
//! A request is refused with `403` when its peer IP is on the ban list or
//! its `User-Agent` matches one of the ban patterns. Requests without a
//! `User-Agent` header are let through.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::USER_AGENT;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use regex::Regex;
use tracing::warn;

use crate::domain::Error as DomainError;

const BANNED_IP: &str = "IP address is banned";
const BANNED_AGENT: &str = "User-agent is banned";

/// Ban lists consulted for every request.
#[derive(Debug, Clone, Default)]
pub struct AccessRules {
    banned_ips: HashSet<IpAddr>,
    banned_user_agents: Vec<Regex>,
}

impl AccessRules {
    /// Build rules from addresses and user-agent regular expressions.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    ///
    /// # Examples
    /// ```
    /// use contacts_backend::middleware::AccessRules;
    ///
    /// let rules = AccessRules::new(["10.10.10.10".parse().unwrap()], ["Somebot"]).unwrap();
    /// assert!(rules.is_banned_agent("Somebot/2.1"));
    /// ```
    pub fn new<I, P>(banned_ips: I, banned_user_agents: P) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = IpAddr>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let banned_user_agents = banned_user_agents
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            banned_ips: banned_ips.into_iter().collect(),
            banned_user_agents,
        })
    }

    /// True when `ip` is on the ban list.
    pub fn is_banned_ip(&self, ip: &IpAddr) -> bool {
        self.banned_ips.contains(ip)
    }

    /// True when any ban pattern matches somewhere in `user_agent`.
    pub fn is_banned_agent(&self, user_agent: &str) -> bool {
        self.banned_user_agents
            .iter()
            .any(|pattern| pattern.is_match(user_agent))
    }

    fn rejection(&self, req: &ServiceRequest) -> Option<&'static str> {
        let peer = req.peer_addr().map(|addr| addr.ip());
        if let Some(ip) = peer.filter(|ip| self.is_banned_ip(ip)) {
            warn!(%ip, "rejected banned peer");
            return Some(BANNED_IP);
        }
        let agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())?;
        if self.is_banned_agent(agent) {
            warn!(user_agent = agent, "rejected banned user agent");
            return Some(BANNED_AGENT);
        }
        None
    }
}

/// Middleware enforcing [`AccessRules`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use contacts_backend::middleware::{AccessGuard, AccessRules};
///
/// let app = App::new().wrap(AccessGuard::new(AccessRules::default()));
/// ```
#[derive(Clone)]
pub struct AccessGuard {
    rules: Arc<AccessRules>,
}

impl AccessGuard {
    pub fn new(rules: AccessRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGuardMiddleware {
            service,
            rules: Arc::clone(&self.rules),
        }))
    }
}

/// Service wrapper produced by [`AccessGuard`].
pub struct AccessGuardMiddleware<S> {
    service: S,
    rules: Arc<AccessRules>,
}

impl<S, B> Service<ServiceRequest> for AccessGuardMiddleware<S>
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
        if let Some(reason) = self.rules.rejection(&req) {
            // Built inside the future so the error picks up the trace id.
            return Box::pin(async move {
                Ok(req
                    .error_response(DomainError::forbidden(reason))
                    .map_into_right_body())
            });
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
