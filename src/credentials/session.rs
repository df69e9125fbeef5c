//! Credentials and the session cookies that go with them.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Portal login details. Never changed by the client.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A cookie for the portal origin, reduced to what is sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
}

impl StoredCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `Cookie` request header (`a=1; b=2`).
    pub fn parse_header(header: &str) -> Vec<Self> {
        header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| Self::new(name, value.trim()))
            })
            .collect()
    }

    /// `name=value`, as accepted by a cookie jar.
    pub fn to_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Everything an [`AuthStore`](super::AuthStore) persists.
#[derive(Debug, Clone)]
pub struct Auth {
    pub credentials: Credentials,
    pub cookies: Vec<StoredCookie>,
}

impl Auth {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cookies: Vec::new(),
        }
    }

    /// Add a cookie.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push(StoredCookie::new(name, value));
        self
    }
}
