//! Glue between a [`CookieJar`] and HTTP header maps.

use crate::cookies::jar::CookieJar;
use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use url::Url;

/// Set the `Cookie` header of an outgoing request to `url` from the jar.
///
/// An existing `Cookie` header is replaced. Returns false, leaving the
/// headers untouched, when no cookie applies.
pub fn attach_cookies(jar: &CookieJar, url: &Url, headers: &mut HeaderMap) -> bool {
    let Some(value) = jar.cookie_header(url) else {
        return false;
    };

    match HeaderValue::from_str(&value) {
        Ok(value) => {
            headers.insert(COOKIE, value);
            true
        }
        Err(_) => {
            tracing::debug!(url = %url, "cookie header is not a valid header value");
            false
        }
    }
}

/// File every `Set-Cookie` header of a response received from `url`.
///
/// Returns the number of header lines read. Values that are not visible
/// ASCII are skipped.
pub fn store_set_cookies(jar: &CookieJar, url: &Url, headers: &HeaderMap) -> usize {
    let lines: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    let count = lines.len();
    jar.set_cookie_lines(url, lines);
    count
}
