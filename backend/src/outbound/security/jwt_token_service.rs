//! HMAC-signed JWTs for access, refresh and email-confirmation tokens.
//!
//! Expiry is checked against the injected clock instead of the system time so
//! token lifetimes are testable.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{EmailAddress, TokenScope};

/// HMAC algorithm names accepted in configuration.
pub const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Resolve a configured algorithm name; only HMAC variants are accepted.
///
/// # Examples
/// ```
/// use contacts_backend::outbound::security::hmac_algorithm;
///
/// assert!(hmac_algorithm("HS512").is_some());
/// assert!(hmac_algorithm("RS256").is_none());
/// ```
pub fn hmac_algorithm(name: &str) -> Option<Algorithm> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

/// Lifetime of each token scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub email: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::from_secs(15 * 60),
            refresh: Duration::from_secs(7 * 24 * 60 * 60),
            email: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl TokenLifetimes {
    fn for_scope(&self, scope: TokenScope) -> Duration {
        match scope {
            TokenScope::AccessToken => self.access,
            TokenScope::RefreshToken => self.refresh,
            TokenScope::EmailToken => self.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    /// Unique per token so rotation never reissues an identical string.
    jti: String,
    iat: i64,
    exp: i64,
    scope: TokenScope,
}

/// [`TokenService`] backed by `jsonwebtoken`.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service signing with `secret`.
    pub fn new(
        secret: Zeroizing<String>,
        algorithm: Algorithm,
        lifetimes: TokenLifetimes,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            lifetimes,
            clock,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

fn invalid(kind: &ErrorKind) -> TokenError {
    let message = match kind {
        ErrorKind::InvalidSignature => "signature mismatch",
        ErrorKind::InvalidAlgorithm => "unexpected algorithm",
        ErrorKind::MissingRequiredClaim(_) => "missing required claim",
        ErrorKind::Json(_) => "malformed claims",
        _ => "malformed token",
    };
    TokenError::invalid(message)
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &EmailAddress, scope: TokenScope) -> Result<String, TokenError> {
        let now = self.clock.utc().timestamp();
        let lifetime = i64::try_from(self.lifetimes.for_scope(scope).as_secs())
            .map_err(|_| TokenError::signing("token lifetime out of range"))?;
        let claims = Claims {
            sub: subject.as_str().to_owned(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
            scope,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str, scope: TokenScope) -> Result<EmailAddress, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation())
            .map_err(|err| invalid(err.kind()))?;
        let claims = data.claims;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        if claims.scope != scope {
            return Err(TokenError::wrong_scope(scope.as_str()));
        }
        EmailAddress::parse(&claims.sub).map_err(|_| TokenError::invalid("subject is not an email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct Harness {
        clock: Arc<MutableClock>,
        service: JwtTokenService,
    }

    fn service_with(secret: &str, algorithm: Algorithm, clock: Arc<MutableClock>) -> JwtTokenService {
        JwtTokenService::new(
            Zeroizing::new(secret.to_owned()),
            algorithm,
            TokenLifetimes::default(),
            clock,
        )
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        ));
        let service = service_with("test-secret", Algorithm::HS256, clock.clone());
        Harness { clock, service }
    }

    fn email() -> EmailAddress {
        EmailAddress::parse("ada@example.com").expect("valid email")
    }

    #[rstest]
    #[case(TokenScope::AccessToken)]
    #[case(TokenScope::RefreshToken)]
    #[case(TokenScope::EmailToken)]
    fn issued_tokens_verify_for_their_scope(harness: Harness, #[case] scope: TokenScope) {
        let token = harness.service.issue(&email(), scope).expect("issue");
        assert_eq!(harness.service.verify(&token, scope).expect("verify"), email());
    }

    #[rstest]
    fn tokens_issued_together_differ(harness: Harness) {
        let first = harness
            .service
            .issue(&email(), TokenScope::RefreshToken)
            .expect("issue");
        let second = harness
            .service
            .issue(&email(), TokenScope::RefreshToken)
            .expect("issue");
        assert_ne!(first, second);
    }

    #[rstest]
    fn scope_mismatch_is_rejected(harness: Harness) {
        let token = harness
            .service
            .issue(&email(), TokenScope::RefreshToken)
            .expect("issue");

        let err = harness
            .service
            .verify(&token, TokenScope::AccessToken)
            .expect_err("wrong scope");
        assert_eq!(err, TokenError::wrong_scope("access_token"));
    }

    #[rstest]
    #[case(TokenScope::AccessToken, Duration::from_secs(15 * 60))]
    #[case(TokenScope::EmailToken, Duration::from_secs(24 * 60 * 60))]
    fn tokens_expire_after_their_lifetime(
        harness: Harness,
        #[case] scope: TokenScope,
        #[case] lifetime: Duration,
    ) {
        let token = harness.service.issue(&email(), scope).expect("issue");

        harness.clock.advance(lifetime - Duration::from_secs(1));
        assert!(harness.service.verify(&token, scope).is_ok());

        harness.clock.advance(Duration::from_secs(1));
        assert_eq!(
            harness.service.verify(&token, scope).expect_err("expired"),
            TokenError::expired()
        );
    }

    #[rstest]
    fn foreign_signature_is_invalid(harness: Harness) {
        let other = service_with("other-secret", Algorithm::HS256, harness.clock.clone());
        let token = other.issue(&email(), TokenScope::AccessToken).expect("issue");

        let err = harness
            .service
            .verify(&token, TokenScope::AccessToken)
            .expect_err("bad signature");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }

    #[rstest]
    fn algorithm_mismatch_is_invalid(harness: Harness) {
        let other = service_with("test-secret", Algorithm::HS512, harness.clock.clone());
        let token = other.issue(&email(), TokenScope::AccessToken).expect("issue");

        assert!(matches!(
            harness.service.verify(&token, TokenScope::AccessToken),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    #[case("Bearer abc")]
    fn garbage_is_invalid(harness: Harness, #[case] token: &str) {
        assert!(matches!(
            harness.service.verify(token, TokenScope::AccessToken),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case("HS256", Some(Algorithm::HS256))]
    #[case("hs384", Some(Algorithm::HS384))]
    #[case(" HS512 ", Some(Algorithm::HS512))]
    #[case("RS256", None)]
    #[case("none", None)]
    fn only_hmac_algorithms_are_accepted(#[case] name: &str, #[case] expected: Option<Algorithm>) {
        assert_eq!(hmac_algorithm(name), expected);
    }
}
