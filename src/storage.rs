use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use uuid::Uuid;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Path under which the object is served back to clients.
    fn public_path(&self, key: &str) -> String;
}

/// Disk-backed storage beneath a configured uploads directory, served
/// statically under `/uploads/`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create uploads dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        // Keys are generated by us; reject anything that could escape the root.
        if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
            anyhow::bail!("invalid object key {:?}", key);
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("remove {}", path.display()))?;
        Ok(())
    }

    fn public_path(&self, key: &str) -> String {
        format!("/uploads/{}", key)
    }
}

/// Collision-resistant object key: millisecond timestamp plus a short
/// random suffix, keeping the original extension.
pub fn object_key(original_filename: Option<&str>, content_type: Option<&str>) -> String {
    let ext = original_filename
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .or_else(|| content_type.and_then(ext_from_mime).map(|e| e.to_string()))
        .unwrap_or_else(|| "bin".to_string());
    let millis = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", millis, &uuid[..8], ext)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_keeps_original_extension() {
        let key = object_key(Some("avatar.PNG"), None);
        assert!(key.ends_with(".png"), "got {}", key);
        assert!(!key.contains('/'));
    }

    #[test]
    fn key_falls_back_to_content_type_then_bin() {
        assert!(object_key(Some("noext"), Some("image/jpeg")).ends_with(".jpg"));
        assert!(object_key(None, Some("application/octet-stream")).ends_with(".bin"));
        assert!(object_key(None, None).ends_with(".bin"));
    }

    #[test]
    fn keys_are_distinct() {
        let a = object_key(Some("x.jpg"), None);
        let b = object_key(Some("x.jpg"), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("accountd-test-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&dir).await.unwrap();

        let key = object_key(Some("photo.jpg"), None);
        storage
            .put_object(&key, Bytes::from_static(b"not really a jpeg"))
            .await
            .unwrap();
        let on_disk = tokio::fs::read(dir.join(&key)).await.unwrap();
        assert_eq!(on_disk, b"not really a jpeg");

        assert_eq!(storage.public_path(&key), format!("/uploads/{}", key));

        storage.delete_object(&key).await.unwrap();
        assert!(tokio::fs::metadata(dir.join(&key)).await.is_err());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let dir = std::env::temp_dir().join(format!("accountd-test-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&dir).await.unwrap();
        assert!(storage
            .put_object("../escape.txt", Bytes::from_static(b"x"))
            .await
            .is_err());
        assert!(storage.delete_object("a/b").await.is_err());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
