//! Staff credential storage

use std::sync::RwLock;

/// Access + refresh token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

/// Where a [`StaffClient`](crate::StaffClient) keeps its tokens
///
/// Implementations may persist to disk or a keychain.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<Credentials>;
    fn store(&self, credentials: Credentials);
    fn clear(&self);
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<Credentials> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store(&self, credentials: Credentials) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credentials);
    }

    fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().is_none());

        let creds = Credentials {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        store.store(creds.clone());
        assert_eq!(store.load(), Some(creds));

        store.clear();
        assert!(store.load().is_none());
    }
}
