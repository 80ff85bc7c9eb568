use thiserror::Error;

/// Errors surfaced by the cookie jar.
///
/// Cookie rejections never reach the caller of
/// [`CookieJar::set_cookies`](crate::cookies::jar::CookieJar::set_cookies):
/// RFC 6265 asks for the cookie to be dropped, not for the response to
/// fail. They are still typed so that resolution can be tested and logged.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // URL Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,

    // Cookie Errors
    #[error("No hostname (IP only) available")]
    CookieNoHostname,
    #[error("Domain attribute of cookie is malformed")]
    CookieMalformedDomain,
    #[error("No domain cookies for TLDs allowed")]
    CookieTldDomain,
    #[error("Cookie domain is a public suffix")]
    CookiePublicSuffix,
    #[error("Cookie domain does not domain-match the request host")]
    CookieBadDomain,
    #[error("Cookie name plus value exceeds the size limit")]
    CookieTooLarge,
    #[error("Cookie name is empty")]
    CookieEmptyName,
    #[error("Cookie line could not be parsed")]
    CookieParseFailed,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::InvalidUrl => -300,
            NetError::DisallowedUrlScheme => -301,
            // Custom cookie codes (the -9xx range is not used by Chromium's net errors)
            NetError::CookiePublicSuffix => -904,
            NetError::CookieNoHostname => -910,
            NetError::CookieMalformedDomain => -911,
            NetError::CookieTldDomain => -912,
            NetError::CookieBadDomain => -913,
            NetError::CookieTooLarge => -914,
            NetError::CookieEmptyName => -915,
            NetError::CookieParseFailed => -916,
            NetError::Unknown(code) => *code,
        }
    }

    /// True for the errors that reject a single received cookie.
    pub fn is_cookie_rejection(&self) -> bool {
        matches!(self.as_i32(), -999..=-900)
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -300 => NetError::InvalidUrl,
            -301 => NetError::DisallowedUrlScheme,
            -904 => NetError::CookiePublicSuffix,
            -910 => NetError::CookieNoHostname,
            -911 => NetError::CookieMalformedDomain,
            -912 => NetError::CookieTldDomain,
            -913 => NetError::CookieBadDomain,
            -914 => NetError::CookieTooLarge,
            -915 => NetError::CookieEmptyName,
            -916 => NetError::CookieParseFailed,
            _ => NetError::Unknown(code),
        }
    }
}

impl From<url::ParseError> for NetError {
    fn from(_: url::ParseError) -> Self {
        NetError::InvalidUrl
    }
}
