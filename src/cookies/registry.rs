//! Per-account cookie jars shared across threads.
//!
//! A client logged into several accounts keeps one [`CookieJar`] per
//! account, usually seeded from a cookie string copied out of a browser.

use crate::base::neterror::NetError;
use crate::cookies::jar::{CookieJar, JarConfig};
use dashmap::DashMap;
use std::sync::Arc;
use url::Url;

/// Thread-safe map from account name to its jar.
/// New jars are built from the registry's [`JarConfig`].
#[derive(Clone)]
pub struct JarRegistry {
    jars: Arc<DashMap<String, Arc<CookieJar>>>,
    config: JarConfig,
}

impl Default for JarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JarRegistry {
    pub fn new() -> Self {
        Self::with_config(JarConfig::default())
    }

    pub fn with_config(config: JarConfig) -> Self {
        Self { jars: Arc::new(DashMap::new()), config }
    }

    pub fn get(&self, account: &str) -> Option<Arc<CookieJar>> {
        self.jars.get(account).map(|jar| jar.clone())
    }

    /// The account's jar, created empty on first use.
    pub fn get_or_create(&self, account: &str) -> Arc<CookieJar> {
        self.jars
            .entry(account.to_string())
            .or_insert_with(|| Arc::new(CookieJar::with_config(self.config.clone())))
            .clone()
    }

    /// Replace the account's jar, returning the previous one.
    pub fn insert(&self, account: &str, jar: Arc<CookieJar>) -> Option<Arc<CookieJar>> {
        self.jars.insert(account.to_string(), jar)
    }

    /// Start a fresh session for `account` from a `name=value; ...` string
    /// served by `url`. Any previous jar of the account is replaced.
    pub fn seed_account(
        &self,
        account: &str,
        url: &Url,
        pairs: &str,
    ) -> Result<Arc<CookieJar>, NetError> {
        let jar = Arc::new(CookieJar::with_config(self.config.clone()));
        let seeded = jar.seed(url, pairs)?;
        tracing::debug!(account, seeded, "seeded account cookie jar");
        self.insert(account, jar.clone());
        Ok(jar)
    }

    pub fn remove(&self, account: &str) -> Option<Arc<CookieJar>> {
        self.jars.remove(account).map(|(_, jar)| jar)
    }

    /// Account names, sorted.
    pub fn accounts(&self) -> Vec<String> {
        let mut accounts: Vec<String> = self.jars.iter().map(|e| e.key().clone()).collect();
        accounts.sort();
        accounts
    }

    pub fn len(&self) -> usize {
        self.jars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Url {
        Url::parse("https://shop.example.com/").unwrap()
    }

    #[test]
    fn test_get_or_create_reuses_jar() {
        let registry = JarRegistry::new();
        let a = registry.get_or_create("alice");
        let b = registry.get_or_create("alice");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("bob").is_none());
    }

    #[test]
    fn test_seed_account() {
        let registry = JarRegistry::new();
        registry.seed_account("alice", &shop(), "sid=1; cart=7").unwrap();
        registry.seed_account("bob", &shop(), "sid=2").unwrap();

        let alice = registry.get("alice").unwrap();
        assert_eq!(alice.cookie_header(&shop()).as_deref(), Some("sid=1; cart=7"));
        let bob = registry.get("bob").unwrap();
        assert_eq!(bob.cookie_header(&shop()).as_deref(), Some("sid=2"));

        assert_eq!(registry.accounts(), ["alice", "bob"]);
    }

    #[test]
    fn test_seed_account_replaces_session() {
        let registry = JarRegistry::new();
        registry.seed_account("alice", &shop(), "sid=old; extra=1").unwrap();
        registry.seed_account("alice", &shop(), "sid=new").unwrap();

        let jar = registry.get("alice").unwrap();
        assert_eq!(jar.cookie_header(&shop()).as_deref(), Some("sid=new"));
    }

    #[test]
    fn test_seed_account_rejects_malformed() {
        let registry = JarRegistry::new();
        assert_eq!(
            registry.seed_account("alice", &shop(), "sid").err(),
            Some(NetError::CookieParseFailed)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove() {
        let registry = JarRegistry::new();
        registry.get_or_create("alice");
        assert!(registry.remove("alice").is_some());
        assert!(registry.remove("alice").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_jars() {
        let registry = JarRegistry::new();
        let clone = registry.clone();
        clone.get_or_create("alice");
        assert!(registry.get("alice").is_some());
    }
}
