//! RFC 6265 cookie jar.
//!
//! | Type | Responsibility |
//! |------|----------------|
//! | [`CookieJar`](jar::CookieJar) | Accept and select cookies for URLs |
//! | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | A stored cookie with resolved domain and expiry |
//! | [`RawCookie`](raw_cookie::RawCookie) | A cookie as received in `Set-Cookie` |
//! | [`CookieStore`](store::CookieStore) | Flat or per-domain-bucket storage |
//! | [`PublicSuffixList`](psl::PublicSuffixList) | Public suffix lookups |
//! | [`JarRegistry`](registry::JarRegistry) | One jar per account |
//!
//! # Usage
//!
//! ```rust
//! use cookiejar::cookies::jar::CookieJar;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let login = Url::parse("https://www.example.com/login").unwrap();
//! jar.set_cookie_lines(&login, ["sid=31d4; Path=/; Secure; HttpOnly", "lang=en; Domain=example.com"]);
//!
//! let api = Url::parse("https://api.example.com/v1").unwrap();
//! assert_eq!(jar.cookie_header(&api).as_deref(), Some("lang=en"));
//! ```

pub mod canonical_cookie;
pub mod headers;
pub mod jar;
pub mod psl;
pub mod raw_cookie;
pub mod registry;
pub mod store;
