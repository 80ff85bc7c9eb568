//! The stored form of a cookie and the RFC 6265 matching rules.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::OffsetDateTime;

/// Represents a stored cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
///
/// The identity of a cookie is the triple `(domain, path, name)`. The
/// domain never carries a leading dot: whether the cookie is a host cookie
/// or a domain cookie is recorded in `host_only`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    /// `None` marks a session cookie.
    pub expiration_time: Option<OffsetDateTime>,
    pub last_access_time: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
}

impl Default for CanonicalCookie {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            domain: String::new(),
            path: "/".to_string(),
            creation_time: OffsetDateTime::UNIX_EPOCH,
            expiration_time: None,
            last_access_time: OffsetDateTime::UNIX_EPOCH,
            secure: false,
            http_only: false,
            host_only: true,
        }
    }
}

impl CanonicalCookie {
    pub fn is_session(&self) -> bool {
        self.expiration_time.is_none()
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        match self.expiration_time {
            Some(expiry) => expiry < current_time,
            None => false,
        }
    }

    /// True if `(domain, path, name)` is this cookie's identity.
    pub fn is_identified_by(&self, domain: &str, path: &str, name: &str) -> bool {
        self.domain == domain && self.path == path && self.name == name
    }

    /// Whether the cookie qualifies for a request to `host`/`path`.
    /// Expiry is the caller's business.
    pub fn should_send(&self, secure: bool, host: &str, path: &str) -> bool {
        self.domain_match(host) && self.path_match(path) && (secure || !self.secure)
    }

    /// RFC 6265 section 5.1.3 domain matching against a canonical
    /// (lowercase, no trailing dot) request host.
    ///
    /// Host cookies require an exact match; domain cookies also match every
    /// subdomain.
    pub fn domain_match(&self, host: &str) -> bool {
        if self.domain == host {
            return true;
        }
        !self.host_only && is_subdomain_of(host, &self.domain)
    }

    /// RFC 6265 section 5.1.4 path matching.
    ///
    /// `/` matches everything, `/any` matches `/any` and `/any/some` but not
    /// `/anything`.
    pub fn path_match(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }

        match request_path.strip_prefix(self.path.as_str()) {
            Some(rest) => self.path.ends_with('/') || rest.starts_with('/'),
            None => false,
        }
    }
}

/// `host` ends with `"." + domain`.
pub(crate) fn is_subdomain_of(host: &str, domain: &str) -> bool {
    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// Send order of RFC 6265 section 5.4 point 2: longer paths first, and for
/// paths of equal length the earlier created cookie first.
pub fn send_order(a: &CanonicalCookie, b: &CanonicalCookie) -> Ordering {
    b.path
        .len()
        .cmp(&a.path.len())
        .then_with(|| a.creation_time.cmp(&b.creation_time))
}
