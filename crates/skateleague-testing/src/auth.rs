//! Mock identity-provider helpers for integration tests.
//!
//! Services read the caller from the ID-token cookie. `MockIdentity` signs a
//! token with the test secret so requests look like they came from a
//! signed-in browser, without a real identity provider.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderValue, header};
use skateleague_auth_types::cookie::ID_TOKEN_COOKIE;
use skateleague_auth_types::identity::Identity;
use skateleague_auth_types::token::issue_id_token;
use skateleague_domain::id::UserId;

/// Secret shared between test token minting and the service under test.
pub const TEST_ID_TOKEN_SECRET: &str = "skateleague-test-id-token-secret";

pub struct MockIdentity {
    pub identity: Identity,
}

impl MockIdentity {
    pub fn new(user_id: &str, email: &str) -> Self {
        let user_id: UserId = user_id.parse().expect("test user id must not be blank");
        Self {
            identity: Identity {
                user_id,
                email: email.to_owned(),
            },
        }
    }

    /// A token valid for the next hour.
    pub fn token(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_secs();
        self.token_expiring_at(now + 3600)
    }

    pub fn token_expiring_at(&self, exp: u64) -> String {
        issue_id_token(&self.identity, exp, TEST_ID_TOKEN_SECRET).expect("sign test token")
    }

    /// Headers carrying the token as the browser cookie.
    pub fn cookie_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{ID_TOKEN_COOKIE}={}", self.token())).unwrap(),
        );
        map
    }

    /// Headers carrying the token as a bearer credential.
    pub fn bearer_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token())).unwrap(),
        );
        map
    }
}
