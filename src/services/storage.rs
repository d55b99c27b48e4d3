use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),
    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Avatars land on the local filesystem under a flat uuid-named layout; the
/// stored relative path is what goes into `users.avatar`.
#[derive(Debug, Clone)]
pub(crate) struct AvatarStore {
    dir: PathBuf,
    max_bytes: usize,
    allowed_extensions: Vec<String>,
}

impl AvatarStore {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            dir: PathBuf::from(&settings.storage().avatar_dir),
            max_bytes: settings.storage().max_upload_size_mb as usize * 1024 * 1024,
            allowed_extensions: settings.storage().allowed_image_extensions.clone(),
        }
    }

    pub(crate) async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let extension = normalized_extension(original_name)
            .filter(|ext| self.allowed_extensions.iter().any(|allowed| allowed == ext))
            .ok_or_else(|| StorageError::UnsupportedExtension(original_name.to_string()))?;

        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge { size: bytes.len(), limit: self.max_bytes });
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        Ok(format!("{}/{file_name}", self.dir.display()))
    }

    pub(crate) async fn remove(&self, stored_path: &str) -> Result<(), StorageError> {
        let path = Path::new(stored_path);
        // Only paths under the avatar directory are ours to delete.
        if !path.starts_with(&self.dir) {
            return Ok(());
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn normalized_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: PathBuf) -> AvatarStore {
        AvatarStore {
            dir,
            max_bytes: 16,
            allowed_extensions: vec!["jpg".to_string(), "png".to_string()],
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("azmoon-avatars-{tag}-{}", Uuid::new_v4()))
    }

    #[test]
    fn normalized_extension_lowercases() {
        assert_eq!(normalized_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(normalized_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(normalized_extension("no-extension"), None);
    }

    #[tokio::test]
    async fn save_rejects_unknown_extension() {
        let result = store(temp_dir("ext")).save("malware.exe", b"1234").await;
        assert!(matches!(result, Err(StorageError::UnsupportedExtension(_))));
    }

    #[tokio::test]
    async fn save_rejects_oversized_payload() {
        let result = store(temp_dir("size")).save("photo.jpg", &[0u8; 32]).await;
        assert!(matches!(result, Err(StorageError::TooLarge { size: 32, limit: 16 })));
    }

    #[tokio::test]
    async fn save_writes_file_and_returns_relative_path() {
        let dir = temp_dir("ok");
        let store = store(dir.clone());

        let stored = store.save("photo.PNG", b"123").await.expect("save");

        assert!(stored.ends_with(".png"));
        let written = tokio::fs::read(&stored).await.expect("read back");
        assert_eq!(written, b"123");

        store.remove(&stored).await.expect("remove");
        assert!(tokio::fs::metadata(&stored).await.is_err());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
