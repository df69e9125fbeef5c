//! Persistence of portal credentials and session cookies.
//!
//! The client loads an [`Auth`] once when it is created and hands the
//! refreshed cookies back through [`AuthStore::save`] when asked to.
//!
//! The file backend stores JSON in `~/.opal`:
//!
//! ```json
//! {
//!   "username": "someone@example.com",
//!   "password": "hunter2",
//!   "cookies": [{ "name": "JSESSIONID", "value": "..." }]
//! }
//! ```

mod file;
mod memory;
mod session;

pub use file::FileAuthStore;
pub use memory::MemoryAuthStore;
pub use session::{Auth, Credentials, StoredCookie};

use anyhow::Result;

/// Where credentials and cookies live between runs.
pub trait AuthStore: Send + Sync {
    /// Load the stored credentials and cookies.
    ///
    /// Failure here prevents a client from being created.
    fn load(&self) -> Result<Auth>;

    /// Replace the stored state with `auth`.
    fn save(&self, auth: &Auth) -> Result<()>;
}
