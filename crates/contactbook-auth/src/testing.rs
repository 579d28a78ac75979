//! In-memory credential store for unit tests

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::AuthError;
use crate::password::hash_password;
use crate::store::{CredentialStore, Principal};

#[derive(Default)]
pub struct MemoryStore {
    principals: RwLock<HashMap<String, Principal>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn with_user(username: &str, password: &str) -> Self {
        let store = Self::default();
        store.insert(username, password);
        store
    }

    pub fn insert(&self, username: &str, password: &str) {
        let principal = Principal {
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
        };
        self.principals.write().insert(username.to_string(), principal);
    }

    pub fn insert_raw(&self, username: &str, password_hash: &str) {
        let principal = Principal {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.principals.write().insert(username.to_string(), principal);
    }

    pub fn remove(&self, username: &str) {
        self.principals.write().remove(username);
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Principal>, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::Store("store unavailable".to_string()));
        }
        Ok(self.principals.read().get(username).cloned())
    }
}
