//! Cookies as received from a server, before the jar has resolved them.

use crate::base::neterror::NetError;
use time::OffsetDateTime;

/// A cookie received in a response, carrying the attributes exactly as
/// sent. Empty `domain`/`path` mean the attribute was absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<OffsetDateTime>,
    /// Seconds; negative requests deletion, `None` or `Some(0)` defers to
    /// `expires`.
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
}

impl RawCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Parse the value of one `Set-Cookie` header.
    ///
    /// `Max-Age` of zero or less is a deletion request and is normalized to
    /// `-1`, so that the jar never confuses it with an absent attribute.
    pub fn parse(line: &str) -> Result<Self, NetError> {
        let parsed = cookie::Cookie::parse(line).map_err(|_| NetError::CookieParseFailed)?;

        let max_age = parsed.max_age().map(|age| match age.whole_seconds() {
            secs if secs <= 0 => -1,
            secs => secs,
        });

        Ok(Self {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain: domain_attribute(line).unwrap_or_default().to_string(),
            path: parsed.path().unwrap_or_default().to_string(),
            expires: parsed.expires().and_then(|e| e.datetime()),
            max_age,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
        })
    }

    /// Split a `name=value; name2=value2` string (the shape of a `Cookie`
    /// request header, or of cookies copied out of a browser) into plain
    /// cookies without attributes.
    pub fn parse_pairs(pairs: &str) -> Result<Vec<Self>, NetError> {
        pairs
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                pair.split_once('=')
                    .map(|(name, value)| Self::new(name.trim(), value.trim()))
                    .ok_or(NetError::CookieParseFailed)
            })
            .collect()
    }

    /// Length that counts against the per-cookie size cap.
    pub fn byte_len(&self) -> usize {
        self.name.len() + self.value.len()
    }
}

/// The last `Domain` attribute of a `Set-Cookie` line, verbatim.
///
/// `cookie` drops a leading dot from the domain, which would let
/// `Domain=.` and `Domain=..example.com` through as valid.
fn domain_attribute(line: &str) -> Option<&str> {
    line.split(';')
        .skip(1)
        .filter_map(|attr| attr.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("domain"))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .last()
}
