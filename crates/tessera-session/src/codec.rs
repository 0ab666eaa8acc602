//! Session cookie encoding.
//!
//! The cookie value is `<key>::<token>`. The key is chosen by the
//! application and is not secret; the token is the credential.

use cookie::{Cookie, CookieJar};
use http::{HeaderMap, HeaderValue, header::SET_COOKIE};

use crate::config::SessionConfig;
use crate::error::CookieError;
use crate::token::SessionToken;

/// Separator between the session key and the token.
pub const DELIMITER: &str = "::";

/// Join a session key and token into a cookie value.
///
/// Fails if either component is empty, contains the delimiter, or contains
/// a byte that is not a legal cookie-octet. A key ending in `:` is rejected
/// too, since the joined value would split at the wrong place.
pub fn encode(key: &str, token: &SessionToken) -> Result<String, CookieError> {
    let token = token.as_str();
    if key.is_empty() {
        return Err(CookieError::EmptyKey);
    }
    if token.is_empty() {
        return Err(CookieError::EmptyToken);
    }
    if key.contains(DELIMITER) || token.contains(DELIMITER) || key.ends_with(':') {
        return Err(CookieError::DelimiterInComponent);
    }
    if !key.bytes().chain(token.bytes()).all(is_cookie_octet) {
        return Err(CookieError::InvalidCharacter);
    }
    Ok(format!("{key}{DELIMITER}{token}"))
}

/// Split a cookie value into its session key and token.
///
/// Splits on the first delimiter. Callers treat any error as "no session".
pub fn decode(value: &str) -> Result<(String, SessionToken), CookieError> {
    let (key, token) = value
        .split_once(DELIMITER)
        .ok_or(CookieError::MissingDelimiter)?;
    if key.is_empty() {
        return Err(CookieError::EmptyKey);
    }
    if token.is_empty() {
        return Err(CookieError::EmptyToken);
    }
    Ok((key.to_string(), SessionToken::new(token)))
}

/// RFC 6265 cookie-octet: visible ASCII except `"`, `,`, `;` and `\`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// Build the session cookie carrying `value` with the configured attributes.
pub fn session_cookie(config: &SessionConfig, value: String) -> Cookie<'static> {
    // Round up so a sub-second TTL does not render as Max-Age=0
    let secs = config.ttl.as_secs() + u64::from(config.ttl.subsec_nanos() > 0);
    let max_age = i64::try_from(secs).unwrap_or(i64::MAX);
    let mut cookie = Cookie::build((config.cookie_name.clone(), value))
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site.into())
        .max_age(cookie::time::Duration::seconds(max_age))
        .build();
    if let Some(domain) = &config.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Build a cookie that tells the client to drop its session cookie.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(config, String::new());
    cookie.make_removal();
    cookie
}

/// Render a cookie as a `Set-Cookie` header value.
///
/// Fails if the rendered cookie contains bytes that are not legal in a
/// header, e.g. a control character in the path.
pub fn header_value(cookie: &Cookie<'_>) -> Result<HeaderValue, CookieError> {
    HeaderValue::from_str(&cookie.to_string()).map_err(|_| CookieError::InvalidHeader)
}

/// Destination for cookies produced while handling a request.
pub trait ResponseSink {
    /// Attach a cookie to the outgoing response.
    fn set_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError>;
}

impl ResponseSink for HeaderMap {
    fn set_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        self.append(SET_COOKIE, header_value(&cookie)?);
        Ok(())
    }
}

impl ResponseSink for CookieJar {
    fn set_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        self.add(cookie);
        Ok(())
    }
}
