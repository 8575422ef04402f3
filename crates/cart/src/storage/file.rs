//! File-backed key-value store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use uuid::Uuid;

use super::{KeyValueStore, StorageError};

const FILE_EXTENSION: &str = "json";

/// A [`KeyValueStore`] keeping one file per key in a directory.
///
/// Writes land in a uniquely named temporary file that is then renamed over
/// the target, so a reader never observes a half-written value.
///
/// Keys may contain ASCII letters, digits, `_`, `-`, and `.`, and must not
/// start with `.`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid_chars = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if key.is_empty() || key.starts_with('.') || !valid_chars {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));

        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("cart").is_ok());
        assert!(validate_key("offline_products").is_ok());
        assert!(validate_key("pendingActions").is_ok());
        assert!(validate_key("v1.cart-backup").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("with space").is_err());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).await.unwrap();

        assert_eq!(store.get("cart").await.unwrap(), None);
        store.set("cart", r#"{"version":1,"items":[]}"#).await.unwrap();
        assert_eq!(
            store.get("cart").await.unwrap().as_deref(),
            Some(r#"{"version":1,"items":[]}"#)
        );

        store.set("cart", "replaced").await.unwrap();
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("replaced"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.remove("cart").await.unwrap();
        store.set("cart", "x").await.unwrap();
        store.remove("cart").await.unwrap();
        assert_eq!(store.get("cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.set("wishlist", "[]").await.unwrap();

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["wishlist.json".to_owned()]);
    }

    #[tokio::test]
    async fn test_rejects_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let err = store.set("../cart", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
