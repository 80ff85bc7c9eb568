//! # cookiejar
//!
//! An in-memory HTTP cookie jar implementing the storage model of
//! RFC 6265.
//!
//! ## Features
//!
//! - **Domain and path matching**: host cookies, domain cookies, `Path`
//!   directories and `Secure` handling
//! - **Public Suffix List**: no domain cookies on `com`, `co.uk` and friends
//! - **Expiry**: `Max-Age` and `Expires`, with lazy reclamation of expired
//!   cookies
//! - **Storage**: one flat list, or buckets keyed by registrable domain
//! - **Thread safety**: a jar can be shared between threads as is
//!
//! ## Quick Start
//!
//! ```rust
//! use cookiejar::CookieJar;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let url = Url::parse("http://www.example.com/").unwrap();
//! jar.set_cookie_lines(&url, ["a=1", "b=2; Max-Age=3600"]);
//! assert_eq!(jar.cookie_header(&url).as_deref(), Some("a=1; b=2"));
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error codes
//! - [`cookies`] - The jar, its storage and public suffix lookups

pub mod base;
pub mod cookies;

pub use base::neterror::NetError;
pub use cookies::canonical_cookie::CanonicalCookie;
pub use cookies::jar::{CookieJar, JarConfig};
pub use cookies::raw_cookie::RawCookie;
pub use cookies::registry::JarRegistry;
pub use cookies::store::StorageKind;
