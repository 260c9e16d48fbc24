//! Product images on the local filesystem

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::application::config::CommerceConfig;
use crate::domain::repository::ImageStore;
use crate::error::{CommerceError, CommerceResult};

/// Writes images under one directory that is served at `public_prefix`
#[derive(Debug, Clone)]
pub struct DiskImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl DiskImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &CommerceConfig) -> Self {
        Self::new(config.upload_dir.clone(), config.public_prefix.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn public_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix, file_name)
    }
}

/// A single path segment made of `[A-Za-z0-9._-]`, not starting with a dot
fn is_safe_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.starts_with('.')
        && file_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl ImageStore for DiskImageStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> CommerceResult<String> {
        if !is_safe_name(file_name) {
            return Err(CommerceError::Internal(format!(
                "Refusing to store image under {file_name:?}"
            )));
        }

        let target = self.root.join(file_name);
        if tokio::fs::try_exists(&target).await? {
            tracing::debug!(file_name, "Image already stored");
            return Ok(self.public_path(file_name));
        }

        tokio::fs::create_dir_all(&self.root).await?;

        // Readers never see a half-written file
        let staging = self.root.join(format!(".{}.{}.part", file_name, Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(file_name, size = bytes.len(), "Image stored");

        Ok(self.public_path(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskImageStore::new(dir.path().join("uploads"), "/uploads/");

        let path = store.save("abc123.png", b"\x89PNG").await.unwrap();
        assert_eq!(path, "/uploads/abc123.png");

        let written = tokio::fs::read(dir.path().join("uploads/abc123.png")).await.unwrap();
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_existing_name_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskImageStore::new(dir.path(), "/uploads");

        store.save("same.gif", b"GIF89a-first").await.unwrap();
        store.save("same.gif", b"GIF89a-second").await.unwrap();

        let written = tokio::fs::read(dir.path().join("same.gif")).await.unwrap();
        assert_eq!(written, b"GIF89a-first");

        // no staging files left behind
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_path_like_names_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskImageStore::new(dir.path(), "/uploads");

        for name in ["../escape.png", "nested/a.png", ".hidden", ""] {
            let err = store.save(name, b"x").await.unwrap_err();
            assert_eq!(err.status_code(), 500, "{name}");
        }
    }
}
