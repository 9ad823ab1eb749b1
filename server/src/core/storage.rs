//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\Holonet\` | `~/Library/Application Support/Holonet/` | `$XDG_DATA_HOME/holonet/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::constants::{APP_DOT_FOLDER, APP_NAME, ENV_DATA_DIR, SESSION_KEY_FILENAME};
use crate::utils::crypto::{decode_signing_key, generate_signing_key};
use crate::utils::file::expand_path;

/// Data subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubdir {
    Sqlite,
}

impl DataSubdir {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataSubdir::Sqlite => "sqlite",
        }
    }

    /// Returns subdirectories that should always be created.
    pub const fn all() -> &'static [DataSubdir] {
        &[DataSubdir::Sqlite]
    }
}

/// Application storage manager
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init() -> Result<Self> {
        let data_dir = Self::resolve_data_dir();

        // Create directories first (canonicalize requires path to exist)
        Self::ensure_directories(&data_dir).await?;

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        tracing::debug!(data_dir = %data_dir.display(), "Storage initialized");

        Ok(Self { data_dir })
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        // Fallback to local .holonet
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(APP_DOT_FOLDER)
    }

    async fn ensure_directories(data_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        for subdir in DataSubdir::all() {
            let path = data_dir.join(subdir.as_str());
            tokio::fs::create_dir_all(&path).await.with_context(|| {
                format!(
                    "Failed to create {} directory: {}",
                    subdir.as_str(),
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to a file within a subdirectory
    pub fn subdir_path(&self, subdir: DataSubdir, filename: &str) -> PathBuf {
        self.data_dir.join(subdir.as_str()).join(filename)
    }

    /// Load the session signing key, generating and persisting one on first start.
    ///
    /// A corrupt key file is an error; it is never silently replaced.
    pub async fn load_or_create_session_key(&self) -> Result<Vec<u8>> {
        let path = self.data_dir.join(SESSION_KEY_FILENAME);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let encoded = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read session key: {}", path.display()))?;
            let key = decode_signing_key(&encoded)
                .with_context(|| format!("Invalid session key file: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Loaded session signing key");
            return Ok(key);
        }

        let key = generate_signing_key();
        tokio::fs::write(&path, hex::encode(&key))
            .await
            .with_context(|| format!("Failed to write session key: {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = tokio::fs::set_permissions(&path, perms).await {
                tracing::warn!(error = %e, "Failed to restrict session key permissions");
            }
        }

        tracing::debug!(path = %path.display(), "Generated new session signing key");
        Ok(key)
    }

    /// Create AppStorage for testing with a specific data directory
    #[cfg(test)]
    pub fn init_for_test(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::SIGNING_KEY_LEN;

    #[test]
    fn test_data_subdir_as_str() {
        assert_eq!(DataSubdir::Sqlite.as_str(), "sqlite");
        assert_eq!(DataSubdir::all(), &[DataSubdir::Sqlite]);
    }

    #[test]
    fn test_subdir_path() {
        let storage = AppStorage::init_for_test(PathBuf::from("/tmp/holonet-test"));
        assert_eq!(
            storage.subdir_path(DataSubdir::Sqlite, "holonet.db"),
            PathBuf::from("/tmp/holonet-test/sqlite/holonet.db")
        );
    }

    #[tokio::test]
    async fn test_ensure_directories_creates_sqlite_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        AppStorage::ensure_directories(&data_dir).await.unwrap();
        assert!(data_dir.join("sqlite").is_dir());
    }

    #[tokio::test]
    async fn test_session_key_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());

        let first = storage.load_or_create_session_key().await.unwrap();
        assert_eq!(first.len(), SIGNING_KEY_LEN);
        assert!(dir.path().join(SESSION_KEY_FILENAME).exists());

        let second = storage.load_or_create_session_key().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_corrupt_session_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_KEY_FILENAME), "not-hex").unwrap();
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());
        assert!(storage.load_or_create_session_key().await.is_err());
    }
}
