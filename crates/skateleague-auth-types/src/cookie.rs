//! Cookie builders for the identity-provider ID token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the ID token.
pub const ID_TOKEN_COOKIE: &str = "skateleague_id_token";

/// Store the ID token in a cookie that lives as long as the token itself.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use skateleague_auth_types::cookie::{set_id_token_cookie, ID_TOKEN_COOKIE};
///
/// let jar = CookieJar::new();
/// let jar = set_id_token_cookie(jar, "token_value".to_string(), "example.com".to_string(), 3600);
/// let cookie = jar.get(ID_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_id_token_cookie(
    jar: CookieJar,
    value: String,
    domain: String,
    max_age_secs: u64,
) -> CookieJar {
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    let cookie = Cookie::build((ID_TOKEN_COOKIE, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(max_age))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the ID-token cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use skateleague_auth_types::cookie::{clear_id_token_cookie, set_id_token_cookie, ID_TOKEN_COOKIE};
///
/// let jar = CookieJar::new();
/// let jar = set_id_token_cookie(jar, "t".to_string(), "example.com".to_string(), 60);
/// let jar = clear_id_token_cookie(jar, "example.com".to_string());
/// let cookie = jar.get(ID_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.value(), "");
/// ```
pub fn clear_id_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((ID_TOKEN_COOKIE, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
