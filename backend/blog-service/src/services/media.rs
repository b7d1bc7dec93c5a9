/// Storage of uploaded post images under the media root
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::forms::ImageUpload;

/// Directory, relative to the media root, that post images go to
const POSTS_DIR: &str = "posts";

/// Longest stored file name. With the directory and a collision suffix the
/// key stays within 100 characters.
const MAX_FILE_NAME_CHARS: usize = 85;

/// Extensions longer than this are not kept apart when truncating
const MAX_EXTENSION_CHARS: usize = 10;

pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a stored key such as `posts/cat.png`
    pub fn path_of(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Write an upload and return its storage key. A taken name gets a
    /// random suffix instead of overwriting the existing file.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String> {
        let dir = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let mut name = sanitize_file_name(&upload.file_name);
        if tokio::fs::try_exists(dir.join(&name)).await? {
            name = with_suffix(&name, &uuid::Uuid::new_v4().simple().to_string()[..8]);
        }

        tokio::fs::write(dir.join(&name), &upload.bytes).await?;

        let key = format!("{}/{}", POSTS_DIR, name);
        debug!(key = %key, size = upload.bytes.len(), "stored post image");
        Ok(key)
    }

    /// Delete a stored upload. A missing file is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_of(key)).await {
            Ok(()) => {
                debug!(key = %key, "removed post image");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Last path component with anything outside `[A-Za-z0-9._-]` replaced,
/// shortened to `MAX_FILE_NAME_CHARS` with the extension kept
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return "upload".to_string();
    }
    truncate_file_name(cleaned)
}

/// `name` is ASCII here, so byte offsets are char offsets
fn truncate_file_name(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_CHARS {
        return name.to_string();
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_CHARS => {
            let keep = MAX_FILE_NAME_CHARS - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => name[..MAX_FILE_NAME_CHARS].to_string(),
    }
}

fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", name, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("cat.png"), "cat.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\pics\\my cat.png"), "my_cat.png");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn long_names_are_cut_keeping_extension() {
        let name = sanitize_file_name(&format!("{}.png", "a".repeat(300)));
        assert_eq!(name.len(), MAX_FILE_NAME_CHARS);
        assert!(name.ends_with("a.png"));

        let no_ext = sanitize_file_name(&"b".repeat(300));
        assert_eq!(no_ext.len(), MAX_FILE_NAME_CHARS);

        let key_len = POSTS_DIR.len() + 1 + with_suffix(&name, "12345678").len();
        assert!(key_len <= 100, "key length {}", key_len);
    }

    #[tokio::test]
    async fn remove_deletes_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let key = storage.save(&upload("small.gif")).await.unwrap();
        storage.remove(&key).await.unwrap();
        assert!(!storage.path_of(&key).exists());
        storage.remove(&key).await.unwrap();
    }

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(with_suffix("cat.png", "ab12"), "cat_ab12.png");
        assert_eq!(with_suffix("cat", "ab12"), "cat_ab12");
    }

    #[tokio::test]
    async fn save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let first = storage.save(&upload("small.gif")).await.unwrap();
        let second = storage.save(&upload("small.gif")).await.unwrap();

        assert_eq!(first, "posts/small.gif");
        assert_ne!(first, second);
        assert!(second.starts_with("posts/small_"));
        assert!(storage.path_of(&second).exists());
    }
}
