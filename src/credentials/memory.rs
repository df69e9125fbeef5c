//! In-memory auth store, for tests and for callers that manage
//! persistence themselves.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{Auth, AuthStore};

/// Auth store kept in memory. Clones share the same state, so a caller can
/// keep one handle and give another to a client.
#[derive(Debug, Clone)]
pub struct MemoryAuthStore {
    auth: Arc<Mutex<Auth>>,
}

impl MemoryAuthStore {
    pub fn new(auth: Auth) -> Self {
        Self {
            auth: Arc::new(Mutex::new(auth)),
        }
    }

    /// The most recently saved state.
    pub fn snapshot(&self) -> Auth {
        self.auth.lock().expect("auth store lock poisoned").clone()
    }
}

impl AuthStore for MemoryAuthStore {
    fn load(&self) -> Result<Auth> {
        Ok(self.snapshot())
    }

    fn save(&self, auth: &Auth) -> Result<()> {
        *self.auth.lock().expect("auth store lock poisoned") = auth.clone();
        Ok(())
    }
}
