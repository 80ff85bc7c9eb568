//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): error codes for URL and cookie failures

pub mod neterror;

#[cfg(test)]
mod tests;
