//! JSON file auth store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{Auth, AuthStore, Credentials, StoredCookie};

/// On-disk layout.
#[derive(Serialize, Deserialize)]
struct AuthFile {
    username: String,
    password: String,
    #[serde(default)]
    cookies: Vec<StoredCookie>,
}

/// Auth store backed by a JSON file that only its owner may read.
#[derive(Debug, Clone)]
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `~/.opal`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".opal"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refuse files that group or other can access.
    #[cfg(unix)]
    fn check_permissions(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std::fs::metadata(&self.path)
            .with_context(|| format!("Failed to stat auth file: {}", self.path.display()))?;
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            anyhow::bail!(
                "security check failed on {}: mode is {mode:04o}; it should not be accessible by group/other",
                self.path.display()
            );
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(&self) -> Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn write_private(&self, content: &str) -> Result<()> {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .with_context(|| format!("Failed to open auth file: {}", self.path.display()))?;
        // `mode` only applies to newly created files.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict auth file: {}", self.path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write auth file: {}", self.path.display()))
    }

    #[cfg(not(unix))]
    fn write_private(&self, content: &str) -> Result<()> {
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write auth file: {}", self.path.display()))
    }
}

impl AuthStore for FileAuthStore {
    fn load(&self) -> Result<Auth> {
        self.check_permissions()?;

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read auth file: {}", self.path.display()))?;
        let file: AuthFile = serde_json::from_str(&content)
            .with_context(|| format!("Bad auth file: {}", self.path.display()))?;

        tracing::debug!(
            path = %self.path.display(),
            cookies = file.cookies.len(),
            "Loaded auth file"
        );

        Ok(Auth {
            credentials: Credentials::new(file.username, file.password),
            cookies: file.cookies,
        })
    }

    fn save(&self, auth: &Auth) -> Result<()> {
        let file = AuthFile {
            username: auth.credentials.username.clone(),
            password: auth.credentials.password.expose_secret().to_owned(),
            cookies: auth.cookies.clone(),
        };
        let content = serde_json::to_string_pretty(&file).context("Failed to serialize auth")?;
        self.write_private(&content)?;

        tracing::debug!(
            path = %self.path.display(),
            cookies = auth.cookies.len(),
            "Saved auth file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileAuthStore::new(dir.path().join("auth.json"));
        assert_eq!(store.path(), dir.path().join("auth.json"));

        let auth = Auth::new(Credentials::new("someone", "hunter2")).with_cookie("JSESSIONID", "abc");
        store.save(&auth)?;

        let loaded = store.load()?;
        assert_eq!(loaded.credentials.username, "someone");
        assert_eq!(loaded.credentials.password.expose_secret(), "hunter2");
        assert_eq!(loaded.cookies, [StoredCookie::new("JSESSIONID", "abc")]);
        Ok(())
    }

    #[test]
    fn test_load_without_cookies() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileAuthStore::new(dir.path().join("auth.json"));
        store.write_private(r#"{"username": "someone", "password": "pw"}"#)?;

        let loaded = store.load()?;
        assert_eq!(loaded.credentials.username, "someone");
        assert!(loaded.cookies.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = FileAuthStore::new(dir.path().join("absent.json"));
        assert!(store.load().is_err());
    }

    #[test]
    fn test_load_malformed_file() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileAuthStore::new(dir.path().join("auth.json"));
        store.write_private("{not json")?;

        let err = store.load().unwrap_err();
        assert!(format!("{err:#}").contains("Bad auth file"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_load_rejects_readable_by_others() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let path = dir.path().join("auth.json");
        std::fs::write(&path, r#"{"username": "someone", "password": "pw"}"#)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;

        let err = FileAuthStore::new(&path).load().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("security check failed"), "{msg}");
        assert!(msg.contains("0644"), "{msg}");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_existing_file() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "")?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;

        let store = FileAuthStore::new(&path);
        store.save(&Auth::new(Credentials::new("someone", "pw")))?;

        let mode = std::fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        store.load()?;
        Ok(())
    }
}
