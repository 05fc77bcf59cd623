//! Identity-provider ID-token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "TOKEN_ISSUER", test))]
use serde::Serialize;

use crate::identity::Identity;

/// Errors returned by [`validate_id_token`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Claims carried by an ID token issued by the identity provider.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | stable user id |
/// | `email` | custom | account email, immutable from our side |
/// | `exp` | `exp` | expiration, seconds since epoch |
///
/// [`Serialize`] is only compiled in with the **`TOKEN_ISSUER`** feature, which test
/// helpers enable to mint tokens. Production code never issues ID tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "TOKEN_ISSUER", test), derive(Serialize))]
pub struct IdTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: u64,
}

/// HS256, `exp` enforced with the default 60s leeway, `sub` + `exp` required.
fn decode_jwt(token: &str, secret: &str) -> Result<IdTokenClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<IdTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate an ID token and return the identity it asserts.
pub fn validate_id_token(token: &str, secret: &str) -> Result<Identity, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims.sub.parse().map_err(|_| AuthError::Malformed)?;
    Ok(Identity {
        user_id,
        email: claims.email,
    })
}

/// Expiration (seconds since epoch) of a token that already passed [`validate_id_token`].
pub fn token_expiry(token: &str, secret: &str) -> Result<u64, AuthError> {
    decode_jwt(token, secret).map(|claims| claims.exp)
}

/// Sign an ID token the way the identity provider would.
#[cfg(any(feature = "TOKEN_ISSUER", test))]
pub fn issue_id_token(
    identity: &Identity,
    exp: u64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = IdTokenClaims {
        sub: identity.user_id.to_string(),
        email: identity.email.clone(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
