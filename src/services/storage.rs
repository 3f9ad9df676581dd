use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "event_images",
            MediaKind::Video => "event_videos",
        }
    }
}

/// Filesystem blob store rooted at the media root.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.media_root.clone(), config.media_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Format: {event_images|event_videos}/{event_name}/{file_id}.{ext}
    pub fn object_key(kind: MediaKind, event_name: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}.{}",
            kind.prefix(),
            sanitize_segment(event_name),
            Uuid::new_v4(),
            get_extension(filename)
        )
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    pub async fn put_object(&self, key: &str, data: &[u8]) -> Result<(), AppError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        tracing::debug!(key, size = data.len(), "Stored media object");
        Ok(())
    }

    /// Removes the object behind `key`. An already missing file is not an
    /// error; returns whether a file was actually removed.
    pub async fn delete_object(&self, key: &str) -> Result<bool, AppError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                tracing::debug!(key, "Deleted media object");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(key, "Media object already absent");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        tokio::fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }
}

// Keeps event names usable as a single path segment.
fn sanitize_segment(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    if cleaned.trim_matches('-').is_empty() {
        "event".to_string()
    } else {
        cleaned
    }
}

fn get_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_namespaced_by_event_name() {
        let key = MediaStorage::object_key(MediaKind::Image, "Gala 2025", "photo.JPG");
        assert!(key.starts_with("event_images/Gala-2025/"));
        assert!(key.ends_with(".jpg"));

        let key = MediaStorage::object_key(MediaKind::Video, "../../etc", "clip");
        assert!(key.starts_with("event_videos/------etc/"));
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_blank_event_name_gets_placeholder_segment() {
        assert_eq!(sanitize_segment("   "), "event");
        assert_eq!(sanitize_segment("///"), "event");
    }

    #[test]
    fn test_url_for_joins_prefix_once() {
        let storage = MediaStorage::new("media", "/media/");
        assert_eq!(storage.url_for("event_images/a/b.png"), "/media/event_images/a/b.png");

        let storage = MediaStorage::new("media", "https://cdn.example.com/media");
        assert_eq!(
            storage.url_for("event_videos/a/b.mp4"),
            "https://cdn.example.com/media/event_videos/a/b.mp4"
        );
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_not_an_error() {
        let root = std::env::temp_dir().join(format!("media-storage-{}", Uuid::new_v4()));
        let storage = MediaStorage::new(&root, "/media/");

        storage.put_object("event_images/x/a.png", b"png").await.unwrap();
        assert!(storage.exists("event_images/x/a.png").await);
        assert!(storage.delete_object("event_images/x/a.png").await.unwrap());
        assert!(!storage.delete_object("event_images/x/a.png").await.unwrap());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
