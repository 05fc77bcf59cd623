//! Request identity extractors.
//!
//! The ID token travels either in the [`ID_TOKEN_COOKIE`] cookie or in an
//! `Authorization: Bearer` header. Services expose an [`IdTokenVerifier`]
//! through `FromRef` on their state.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;
use serde::{Deserialize, Serialize};
use skateleague_domain::id::UserId;

use crate::cookie::ID_TOKEN_COOKIE;
use crate::token::{AuthError, validate_id_token};

/// Authenticated user as asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

/// Validates ID tokens against the shared signing secret.
#[derive(Clone)]
pub struct IdTokenVerifier {
    secret: Arc<str>,
}

impl IdTokenVerifier {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        validate_id_token(token, &self.secret)
    }

    pub fn expiry(&self, token: &str) -> Result<u64, AuthError> {
        crate::token::token_expiry(token, &self.secret)
    }
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier").finish_non_exhaustive()
    }
}

/// Raw token from the cookie, falling back to a bearer header.
fn raw_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ID_TOKEN_COOKIE) {
        let value = cookie.value();
        if !value.is_empty() {
            return Some(value.to_owned());
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn resolve(parts: &Parts, verifier: &IdTokenVerifier) -> Option<Identity> {
    let token = raw_token(parts)?;
    match verifier.verify(&token) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid id token");
            None
        }
    }
}

/// Identity of the caller, or `None` when signed out.
///
/// Never rejects: invalid or expired tokens count as signed out.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    IdTokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    // Resolved synchronously so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let verifier = IdTokenVerifier::from_ref(state);
        let identity = resolve(parts, &verifier);
        async move { Ok(Self(identity)) }
    }
}

/// Requires a signed-in caller; rejects with 401 otherwise.
impl<S> FromRequestParts<S> for Identity
where
    IdTokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let verifier = IdTokenVerifier::from_ref(state);
        let identity = resolve(parts, &verifier);
        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
