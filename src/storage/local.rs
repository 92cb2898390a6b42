use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{ObjectStore, StorageError, object_name};

/// Stores images as files in a directory that the HTTP layer serves
/// under `public_prefix`.
pub struct LocalObjectStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalObjectStore {
    pub async fn new(root: impl AsRef<Path>, public_prefix: &str) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create image directory: {}", root.display()))?;

        Ok(Self {
            root,
            public_prefix: normalize_prefix(public_prefix),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a hosted reference back to a file inside `root`.
    fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let name = reference
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::ForeignReference(reference.to_string()))?;

        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(StorageError::ForeignReference(reference.to_string()));
        }

        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String, StorageError> {
        let name = object_name(mime_type);
        let path = self.root.join(&name);

        fs::write(&path, &bytes).await?;
        info!(path = %path.display(), size = bytes.len(), "Stored image");

        Ok(format!("{}/{}", self.public_prefix, name))
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        let path = self.resolve(reference)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/images/").await.unwrap();

        let reference = store
            .upload(b"fake-png".to_vec(), "image/png")
            .await
            .unwrap();
        assert!(reference.starts_with("/images/"));
        assert!(reference.ends_with(".png"));

        let file = dir.path().join(reference.trim_start_matches("/images/"));
        assert_eq!(std::fs::read(&file).unwrap(), b"fake-png");

        store.delete(&reference).await.unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_delete_missing_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "images").await.unwrap();

        let err = store.delete("/images/gone.png").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_references_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/images").await.unwrap();

        for reference in [
            "https://cdn.example.com/a.png",
            "/images/../config.toml",
            "/images/",
            "/images/nested/a.png",
        ] {
            let err = store.delete(reference).await.unwrap_err();
            assert!(matches!(err, StorageError::ForeignReference(_)), "{reference}");
        }
    }
}
