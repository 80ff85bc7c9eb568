//! The cookie jar: RFC 6265 storage model on top of a [`CookieStore`].
//!
//! [`CookieJar::set_cookies`] files the cookies received in a response to a
//! URL, [`CookieJar::cookies_for`] selects the cookies to send with a
//! request. Every operation runs under one lock for the whole jar.
//!
//! ```rust
//! use cookiejar::cookies::jar::CookieJar;
//! use cookiejar::cookies::raw_cookie::RawCookie;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let url = Url::parse("http://www.example.com/docs/index.html").unwrap();
//! jar.set_cookies(&url, &[RawCookie::new("lang", "en")]);
//!
//! let request = Url::parse("http://www.example.com/docs/api").unwrap();
//! assert_eq!(jar.cookie_header(&request).as_deref(), Some("lang=en"));
//! ```

use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::{is_subdomain_of, send_order, CanonicalCookie};
use crate::cookies::psl::{MozillaList, PublicSuffixList};
use crate::cookies::raw_cookie::RawCookie;
use crate::cookies::store::{CookieStore, StorageKind};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use url::{Host, Url};

/// Default cap on `name.len() + value.len()` of a single cookie.
pub const DEFAULT_MAX_BYTES_PER_COOKIE: usize = 4096;

/// Expiry of cookies whose `Max-Age` reaches past the representable range.
const FAR_FUTURE: OffsetDateTime = PrimitiveDateTime::MAX.assume_utc();

/// Jar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JarConfig {
    /// Cookies whose name plus value exceed this many bytes are dropped.
    /// Zero disables the check.
    pub max_bytes_per_cookie: usize,
    /// Accept `Domain=<ip>` on a request to that same IP, storing a host
    /// cookie. RFC 6265 forbids it, most browsers allow it.
    pub host_cookie_on_ip: bool,
    /// Accept domain cookies on public suffixes such as `co.uk`.
    pub domain_cookies_on_public_suffixes: bool,
    pub storage: StorageKind,
}

impl Default for JarConfig {
    fn default() -> Self {
        Self {
            max_bytes_per_cookie: DEFAULT_MAX_BYTES_PER_COOKIE,
            host_cookie_on_ip: false,
            domain_cookies_on_public_suffixes: false,
            storage: StorageKind::Flat,
        }
    }
}

impl JarConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_bytes_per_cookie(mut self, max: usize) -> Self {
        self.max_bytes_per_cookie = max;
        self
    }

    pub fn host_cookie_on_ip(mut self, allow: bool) -> Self {
        self.host_cookie_on_ip = allow;
        self
    }

    pub fn domain_cookies_on_public_suffixes(mut self, allow: bool) -> Self {
        self.domain_cookies_on_public_suffixes = allow;
        self
    }

    pub fn storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }
}

/// Outcome of filing one received cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateAction {
    Created,
    Updated,
    Deleted,
    NoSuchCookie,
}

enum Expiry {
    Delete,
    Session,
    At(OffsetDateTime),
}

struct JarState {
    store: Box<dyn CookieStore>,
    /// Last timestamp handed out by [`JarState::stamp`].
    last_stamp: OffsetDateTime,
}

impl JarState {
    /// Current time, forced strictly past every earlier stamp so creation
    /// order is total even within one clock tick.
    fn stamp(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let stamp = if now > self.last_stamp {
            now
        } else {
            self.last_stamp + Duration::nanoseconds(1)
        };
        self.last_stamp = stamp;
        stamp
    }
}

/// In-memory RFC 6265 cookie jar.
///
/// Only `http` and `https` URLs are served; all other schemes are ignored.
/// Domain names are treated as fully qualified whether or not they end in
/// a dot.
pub struct CookieJar {
    config: JarConfig,
    suffixes: Arc<dyn PublicSuffixList>,
    state: Mutex<JarState>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Flat storage, default limits, Mozilla's public suffix list.
    pub fn new() -> Self {
        Self::with_config(JarConfig::default())
    }

    pub fn with_storage(storage: StorageKind) -> Self {
        Self::with_config(JarConfig::default().storage(storage))
    }

    pub fn with_config(config: JarConfig) -> Self {
        Self::with_suffix_list(config, Arc::new(MozillaList))
    }

    pub fn with_suffix_list(config: JarConfig, suffixes: Arc<dyn PublicSuffixList>) -> Self {
        let store = config.storage.build(suffixes.clone());
        Self {
            config,
            suffixes,
            state: Mutex::new(JarState {
                store,
                last_stamp: OffsetDateTime::UNIX_EPOCH,
            }),
        }
    }

    pub fn config(&self) -> &JarConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, JarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// File the cookies received in a response to `url`.
    ///
    /// Invalid cookies are dropped one by one, never failing the batch.
    pub fn set_cookies(&self, url: &Url, cookies: &[RawCookie]) {
        if !is_http(url) {
            return;
        }
        let Ok(host) = canonical_host(url) else {
            return;
        };
        let default_path = default_path(url.path());

        let mut state = self.lock();
        for raw in cookies {
            let filed = if self.config.max_bytes_per_cookie > 0
                && raw.byte_len() > self.config.max_bytes_per_cookie
            {
                Err(NetError::CookieTooLarge)
            } else {
                self.update(&mut state, &host, default_path, raw)
            };

            match filed {
                Ok(action) => {
                    tracing::trace!(name = %raw.name, host = %host, ?action, "cookie filed");
                }
                Err(reason) => {
                    tracing::debug!(
                        name = %raw.name,
                        host = %host,
                        domain = %raw.domain,
                        %reason,
                        "rejecting cookie"
                    );
                }
            }
        }
    }

    /// Parse raw `Set-Cookie` header values and file them. Lines that do
    /// not parse are skipped.
    pub fn set_cookie_lines<I, S>(&self, url: &Url, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cookies: Vec<RawCookie> = lines
            .into_iter()
            .filter_map(|line| match RawCookie::parse(line.as_ref()) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::debug!(line = line.as_ref(), error = %e, "skipping Set-Cookie line");
                    None
                }
            })
            .collect();
        self.set_cookies(url, &cookies);
    }

    /// Store a `name=value; name2=value2` string as host cookies of `url`,
    /// as if the server had set them. Returns how many cookies were read.
    pub fn seed(&self, url: &Url, pairs: &str) -> Result<usize, NetError> {
        if !is_http(url) {
            return Err(NetError::DisallowedUrlScheme);
        }
        let cookies = RawCookie::parse_pairs(pairs)?;
        self.set_cookies(url, &cookies);
        Ok(cookies.len())
    }

    /// The cookies to send with a request to `url`, as name/value pairs in
    /// send order.
    ///
    /// Every returned cookie gets a fresh last-access time; the first one
    /// gets "now", each following one a nanosecond more.
    pub fn cookies_for(&self, url: &Url) -> Vec<(String, String)> {
        if !is_http(url) {
            return Vec::new();
        }
        let Ok(host) = canonical_host(url) else {
            return Vec::new();
        };
        let secure = url.scheme() == "https";
        let path = match url.path() {
            "" => "/",
            path => path,
        };

        let mut guard = self.lock();
        let state = &mut *guard;
        let now = state.stamp();

        let mut selected = state.store.retrieve(secure, &host, path, now);
        selected.sort_by(|a, b| send_order(a, b));

        let mut stamp = now;
        let mut pairs = Vec::with_capacity(selected.len());
        for cookie in selected {
            cookie.last_access_time = stamp;
            pairs.push((cookie.name.clone(), cookie.value.clone()));
            stamp += Duration::nanoseconds(1);
        }
        if !pairs.is_empty() {
            state.last_stamp = stamp - Duration::nanoseconds(1);
        }

        tracing::trace!(host = %host, path, count = pairs.len(), "selected cookies");
        pairs
    }

    /// The value of a `Cookie` request header for `url`, or `None` when no
    /// cookie applies.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let pairs = self.cookies_for(url);
        if pairs.is_empty() {
            return None;
        }
        Some(
            pairs
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Copies of all cookies that have not expired.
    pub fn all(&self) -> Vec<CanonicalCookie> {
        let now = OffsetDateTime::now_utc();
        let state = self.lock();
        state
            .store
            .cookies()
            .filter(|c| !c.is_expired(now))
            .cloned()
            .collect()
    }

    /// Store already resolved cookies, replacing any with the same
    /// `(domain, path, name)`. Expired cookies are skipped; last-access
    /// times are kept as given.
    pub fn add(&self, cookies: impl IntoIterator<Item = CanonicalCookie>) {
        let mut state = self.lock();
        let now = OffsetDateTime::now_utc();
        for cookie in cookies {
            if cookie.is_expired(now) {
                continue;
            }
            let slot = state
                .store
                .find(&cookie.domain, &cookie.path, &cookie.name, now);
            *slot = cookie;
        }
    }

    /// Delete the cookie `(domain, path, name)`. The domain is lowercased
    /// and stripped of surrounding dots first. Returns true if the cookie
    /// was present.
    pub fn remove(&self, domain: &str, path: &str, name: &str) -> bool {
        let domain = domain.to_lowercase();
        let domain = domain.trim_matches('.');
        self.lock().store.delete(domain, path, name)
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.lock()
            .store
            .cookies()
            .filter(|c| !c.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().store.clear();
    }

    /// Reclaim the slots of expired cookies now instead of waiting for
    /// lookups to do it. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.lock();
        let now = state.stamp();
        state.store.compact(now)
    }

    /// Store, update or delete one received cookie.
    fn update(
        &self,
        state: &mut JarState,
        host: &str,
        default_path: &str,
        raw: &RawCookie,
    ) -> Result<UpdateAction, NetError> {
        if raw.name.is_empty() {
            return Err(NetError::CookieEmptyName);
        }

        let (domain, host_only) = self.domain_and_type(host, &raw.domain)?;

        let path = if raw.path.starts_with('/') {
            raw.path.as_str()
        } else {
            default_path
        };

        let now = state.stamp();

        // Max-Age takes precedence over Expires.
        let expiry = match raw.max_age {
            Some(age) if age < 0 => Expiry::Delete,
            Some(age) if age > 0 => Expiry::At(
                now.checked_add(Duration::seconds(age))
                    .unwrap_or(FAR_FUTURE),
            ),
            _ => match raw.expires {
                Some(expires) if expires < now => Expiry::Delete,
                Some(expires) => Expiry::At(expires),
                None => Expiry::Session,
            },
        };

        let expiration_time = match expiry {
            Expiry::Delete => {
                return Ok(if state.store.delete(&domain, path, &raw.name) {
                    tracing::debug!(name = %raw.name, domain = %domain, path, "deleted cookie");
                    UpdateAction::Deleted
                } else {
                    UpdateAction::NoSuchCookie
                });
            }
            Expiry::Session => None,
            Expiry::At(at) => Some(at),
        };

        let cookie = state.store.find(&domain, path, &raw.name, now);
        let action = if cookie.name.is_empty() {
            cookie.name = raw.name.clone();
            cookie.domain = domain;
            cookie.path = path.to_string();
            cookie.creation_time = now;
            UpdateAction::Created
        } else {
            UpdateAction::Updated
        };

        cookie.value = raw.value.clone();
        cookie.host_only = host_only;
        cookie.secure = raw.secure;
        cookie.http_only = raw.http_only;
        cookie.expiration_time = expiration_time;
        cookie.last_access_time = now;

        Ok(action)
    }

    /// Resolve the stored domain of a cookie received from `host` with the
    /// given domain attribute, and whether it is a host cookie.
    /// RFC 6265 section 5.3 steps 4 to 6.
    pub(crate) fn domain_and_type(
        &self,
        host: &str,
        domain_attr: &str,
    ) -> Result<(String, bool), NetError> {
        if domain_attr.is_empty() {
            return Ok((host.to_string(), true));
        }

        if is_ip(host) {
            // IP addresses never domain-match. Browsers still accept a
            // host cookie when the attribute repeats the address.
            if self.config.host_cookie_on_ip && domain_attr == host {
                return Ok((host.to_string(), true));
            }
            return Err(NetError::CookieNoHostname);
        }

        let domain = domain_attr.strip_prefix('.').unwrap_or(domain_attr);
        if domain.is_empty() || domain.starts_with('.') {
            // "Domain=." or "Domain=..some.thing"
            return Err(NetError::CookieMalformedDomain);
        }
        let domain = domain.to_lowercase();
        if domain.ends_with('.') {
            // "Domain=www.example.com."
            return Err(NetError::CookieMalformedDomain);
        }

        // Never a domain cookie for a single label like "com".
        if !domain.contains('.') {
            return Err(NetError::CookieTldDomain);
        }

        if !self.config.domain_cookies_on_public_suffixes
            && !self.suffixes.allow_domain_cookies(&domain)
        {
            if domain == host {
                return Ok((domain, true));
            }
            return Err(NetError::CookiePublicSuffix);
        }

        if domain != host && !is_subdomain_of(host, &domain) {
            return Err(NetError::CookieBadDomain);
        }

        Ok((domain, false))
    }
}

/// `http` or `https`.
fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// RFC 6265 section 5.1.2 canonical host: lowercase, no port, no brackets,
/// no trailing dot. Internationalized names arrive punycoded from `url`.
fn canonical_host(url: &Url) -> Result<String, NetError> {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_lowercase();
            match domain.strip_suffix('.') {
                Some(stripped) if !stripped.is_empty() => Ok(stripped.to_string()),
                Some(_) => Err(NetError::InvalidUrl),
                None => Ok(domain),
            }
        }
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
        None => Err(NetError::InvalidUrl),
    }
}

fn is_ip(host: &str) -> bool {
    host.parse::<IpAddr>().is_ok()
}

/// The "directory" of a request path, RFC 6265 section 5.1.4:
///
/// | path | directory |
/// |------|-----------|
/// | `""`, `"xy/z"` | `"/"` |
/// | `"/abc"` | `"/"` |
/// | `"/ab/xy/km"` | `"/ab/xy"` |
/// | `"/abc/"` | `"/abc"` |
fn default_path(path: &str) -> &str {
    if !path.starts_with('/') {
        return "/";
    }
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}
