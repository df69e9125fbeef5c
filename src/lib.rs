//! Access to Opal card balances and trip history.
//!
//! The Opal portal has no public API, so [`PortalClient`] keeps a cookie
//! session the way a browser would, logs in again when the portal bounces
//! it to the login page, and extracts typed records from the returned HTML.
//!
//! ```no_run
//! use opal::{ActivityRequest, Config, FileAuthStore, PortalClient};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let store = FileAuthStore::new(config.auth_file_path()?);
//! let mut client = PortalClient::new(&config, store)?;
//!
//! for card in client.fetch_overview()?.cards {
//!     println!("{}: {}", card.name, card.balance);
//! }
//! let activity = client.fetch_activity(ActivityRequest::new(0))?;
//! println!("{} transactions", activity.transactions.len());
//!
//! client.save_auth()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod duration;
pub mod error;
pub mod fields;
pub mod html;
pub mod models;
pub mod parse;

pub use client::PortalClient;
pub use config::Config;
pub use credentials::{Auth, AuthStore, Credentials, FileAuthStore, MemoryAuthStore, StoredCookie};
pub use error::{Error, Page, Result};
pub use models::{Activity, ActivityRequest, Card, Overview, Transaction};
