//! Cookie storage strategies.
//!
//! A [`CookieJar`](crate::cookies::jar::CookieJar) owns exactly one
//! [`CookieStore`], picked once at construction:
//!
//! | Strategy | Layout | Good for |
//! |----------|--------|----------|
//! | [`FlatStore`] | one unordered `Vec`, scanned linearly | few sites |
//! | [`BoxedStore`] | eTLD+1 → [`FlatStore`] | many unrelated sites |
//!
//! Expired cookies are never returned but stay in place until their slot is
//! reused by [`CookieStore::find`] or reclaimed by compaction.

use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::cookies::psl::PublicSuffixList;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;

/// Compaction runs once more than this many cookies are expired...
const COMPACT_MIN_EXPIRED: usize = 10;
/// ...and they make up more than 1/`COMPACT_RATIO_DIVISOR` of the store.
const COMPACT_RATIO_DIVISOR: usize = 5;

/// The contract every storage strategy satisfies.
pub trait CookieStore: Send {
    /// Unsorted list of the live cookies to send with a request to
    /// `host`/`path`. May compact the store as a side effect.
    fn retrieve(
        &mut self,
        secure: bool,
        host: &str,
        path: &str,
        now: OffsetDateTime,
    ) -> Vec<&mut CanonicalCookie>;

    /// The cookie identified by `(domain, path, name)`, or a fresh record
    /// for the caller to fill in. A fresh record has an empty name; it may
    /// occupy the slot of an expired cookie.
    fn find(
        &mut self,
        domain: &str,
        path: &str,
        name: &str,
        now: OffsetDateTime,
    ) -> &mut CanonicalCookie;

    /// Remove the cookie `(domain, path, name)`. Returns true if it was
    /// present.
    fn delete(&mut self, domain: &str, path: &str, name: &str) -> bool;

    /// Every stored cookie, expired ones included.
    fn cookies(&self) -> Box<dyn Iterator<Item = &CanonicalCookie> + '_>;

    /// Physically drop expired cookies. Returns how many were dropped.
    fn compact(&mut self, now: OffsetDateTime) -> usize;

    fn clear(&mut self);

    /// Number of stored cookies, expired ones included.
    fn len(&self) -> usize {
        self.cookies().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which [`CookieStore`] a jar uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    #[default]
    Flat,
    Boxed,
}

impl StorageKind {
    pub fn build(self, suffixes: Arc<dyn PublicSuffixList>) -> Box<dyn CookieStore> {
        match self {
            StorageKind::Flat => Box::new(FlatStore::new()),
            StorageKind::Boxed => Box::new(BoxedStore::new(suffixes)),
        }
    }
}

// ---------------------------------------------------------------------------
// Flat

/// Unordered list of cookies, searched linearly.
#[derive(Debug, Clone, Default)]
pub struct FlatStore {
    cookies: Vec<CanonicalCookie>,
}

impl FlatStore {
    pub fn new() -> Self {
        Self {
            cookies: Vec::with_capacity(16),
        }
    }

    fn expired_count(&self, now: OffsetDateTime) -> usize {
        self.cookies.iter().filter(|c| c.is_expired(now)).count()
    }

    fn position(&self, domain: &str, path: &str, name: &str) -> Option<usize> {
        self.cookies
            .iter()
            .position(|c| c.is_identified_by(domain, path, name))
    }
}

impl From<Vec<CanonicalCookie>> for FlatStore {
    fn from(cookies: Vec<CanonicalCookie>) -> Self {
        Self { cookies }
    }
}

impl CookieStore for FlatStore {
    fn retrieve(
        &mut self,
        secure: bool,
        host: &str,
        path: &str,
        now: OffsetDateTime,
    ) -> Vec<&mut CanonicalCookie> {
        let expired = self.expired_count(now);
        if expired > COMPACT_MIN_EXPIRED && expired > self.cookies.len() / COMPACT_RATIO_DIVISOR {
            self.compact(now);
        }

        self.cookies
            .iter_mut()
            .filter(|c| !c.is_expired(now) && c.should_send(secure, host, path))
            .collect()
    }

    fn find(
        &mut self,
        domain: &str,
        path: &str,
        name: &str,
        now: OffsetDateTime,
    ) -> &mut CanonicalCookie {
        let mut existing = None;
        let mut reusable = None;
        for (i, cookie) in self.cookies.iter().enumerate() {
            if cookie.is_identified_by(domain, path, name) {
                existing = Some(i);
                break;
            }
            if reusable.is_none() && cookie.is_expired(now) {
                reusable = Some(i);
            }
        }

        let idx = match (existing, reusable) {
            (Some(i), _) => i,
            (None, Some(i)) => {
                self.cookies[i] = CanonicalCookie::default();
                i
            }
            (None, None) => {
                self.cookies.push(CanonicalCookie::default());
                self.cookies.len() - 1
            }
        };
        &mut self.cookies[idx]
    }

    fn delete(&mut self, domain: &str, path: &str, name: &str) -> bool {
        match self.position(domain, path, name) {
            Some(i) => {
                self.cookies.swap_remove(i);
                true
            }
            None => false,
        }
    }

    fn cookies(&self) -> Box<dyn Iterator<Item = &CanonicalCookie> + '_> {
        Box::new(self.cookies.iter())
    }

    /// Overwrites expired slots from the front with live cookies taken from
    /// the back, then truncates.
    fn compact(&mut self, now: OffsetDateTime) -> usize {
        let before = self.cookies.len();
        let (mut i, mut j) = (0, before);

        loop {
            while i < j && !self.cookies[i].is_expired(now) {
                i += 1;
            }
            while j > i && self.cookies[j - 1].is_expired(now) {
                j -= 1;
            }
            if i >= j {
                break;
            }
            self.cookies.swap(i, j - 1);
            i += 1;
            j -= 1;
        }

        self.cookies.truncate(j);
        let removed = before - j;
        if removed > 0 {
            tracing::debug!(expired = removed, remaining = j, "compacted cookie store");
        }
        removed
    }

    fn clear(&mut self) {
        self.cookies.clear();
    }

    fn len(&self) -> usize {
        self.cookies.len()
    }
}

// ---------------------------------------------------------------------------
// Boxed

/// Cookies grouped by the eTLD+1 of their domain. Each group is a
/// [`FlatStore`].
pub struct BoxedStore {
    boxes: HashMap<String, FlatStore>,
    suffixes: Arc<dyn PublicSuffixList>,
}

impl BoxedStore {
    pub fn new(suffixes: Arc<dyn PublicSuffixList>) -> Self {
        Self {
            boxes: HashMap::new(),
            suffixes,
        }
    }

    /// The box for `domain`: its eTLD+1, or the domain itself when it has
    /// none (single label hosts, bare suffixes).
    fn box_key(&self, domain: &str) -> String {
        self.suffixes
            .effective_tld_plus_one(domain)
            .unwrap_or(domain)
            .to_string()
    }

    /// Number of boxes in use.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }
}

impl CookieStore for BoxedStore {
    fn retrieve(
        &mut self,
        secure: bool,
        host: &str,
        path: &str,
        now: OffsetDateTime,
    ) -> Vec<&mut CanonicalCookie> {
        let key = self.box_key(host);
        match self.boxes.get_mut(&key) {
            Some(flat) => flat.retrieve(secure, host, path, now),
            None => Vec::new(),
        }
    }

    fn find(
        &mut self,
        domain: &str,
        path: &str,
        name: &str,
        now: OffsetDateTime,
    ) -> &mut CanonicalCookie {
        let key = self.box_key(domain);
        self.boxes
            .entry(key)
            .or_default()
            .find(domain, path, name, now)
    }

    fn delete(&mut self, domain: &str, path: &str, name: &str) -> bool {
        let key = self.box_key(domain);
        let Some(flat) = self.boxes.get_mut(&key) else {
            return false;
        };
        let existed = flat.delete(domain, path, name);
        if flat.is_empty() {
            self.boxes.remove(&key);
        }
        existed
    }

    fn cookies(&self) -> Box<dyn Iterator<Item = &CanonicalCookie> + '_> {
        Box::new(self.boxes.values().flat_map(|flat| flat.cookies.iter()))
    }

    fn compact(&mut self, now: OffsetDateTime) -> usize {
        let removed = self.boxes.values_mut().map(|flat| flat.compact(now)).sum();
        self.boxes.retain(|_, flat| !flat.is_empty());
        removed
    }

    fn clear(&mut self) {
        self.boxes.clear();
    }

    fn len(&self) -> usize {
        self.boxes.values().map(|flat| flat.cookies.len()).sum()
    }
}
