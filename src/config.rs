//! Client configuration, read from `opal.toml`.
//!
//! ```toml
//! base_url = "https://www.opal.com.au"
//! timeout = "30s"
//! time_zone = "Australia/Sydney"
//! auth_file = "/home/me/.opal"
//! ```
//!
//! Every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::credentials::FileAuthStore;
use crate::duration::deserialize_optional_duration;

fn default_base_url() -> String {
    "https://www.opal.com.au".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string()
}

fn default_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_time_zone() -> String {
    crate::fields::PORTAL_ZONE.name().to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal origin. Overridden in tests to point at a local server.
    pub base_url: String,

    pub user_agent: String,

    /// Whole-request timeout; `"off"` disables it.
    #[serde(deserialize_with = "deserialize_optional_duration")]
    pub timeout: Option<Duration>,

    /// IANA zone the portal's timestamps are written in.
    pub time_zone: String,

    /// Auth file path. Defaults to `~/.opal`.
    pub auth_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            time_zone: default_time_zone(),
            auth_file: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Catch a bad zone name at load time rather than on first fetch.
        config.zone()?;
        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Config pointing at another portal origin, otherwise default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn zone(&self) -> Result<Tz> {
        self.time_zone
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown time zone {:?}", self.time_zone))
    }

    pub fn auth_file_path(&self) -> Result<PathBuf> {
        match &self.auth_file {
            Some(path) => Ok(path.clone()),
            None => FileAuthStore::default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.opal.com.au");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.zone().unwrap(), chrono_tz::Australia::Sydney);
        assert!(config.auth_file.is_none());
    }

    #[test]
    fn test_load_full() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
base_url = "http://127.0.0.1:8080"
user_agent = "opal-test"
timeout = "2m"
time_zone = "UTC"
auth_file = "/tmp/opal-auth.json"
"#
        )?;

        let config = Config::load(file.path())?;
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.user_agent, "opal-test");
        assert_eq!(config.timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.zone()?, chrono_tz::UTC);
        assert_eq!(config.auth_file_path()?, PathBuf::from("/tmp/opal-auth.json"));
        Ok(())
    }

    #[test]
    fn test_load_partial_uses_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"timeout = "off""#)?;

        let config = Config::load(file.path())?;
        assert_eq!(config.timeout, None);
        assert_eq!(config.base_url, default_base_url());
        assert_eq!(config.time_zone, "Australia/Sydney");
        Ok(())
    }

    #[test]
    fn test_load_rejects_bad_values() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"time_zone = "Mars/Olympus_Mons""#)?;
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown time zone"));

        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"timeout = "soon""#)?;
        assert!(Config::load(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_load_or_default_missing_file() -> Result<()> {
        let config = Config::load_or_default(Path::new("/nonexistent/opal.toml"))?;
        assert_eq!(config.base_url, default_base_url());
        Ok(())
    }
}
