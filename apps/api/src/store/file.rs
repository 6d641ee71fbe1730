use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::store::backend::{StorageBackend, StorageError};

/// One JSON file per key under `root`.
///
/// Writes land in a temp file in the same directory which is then renamed
/// over the target, so a crashed or failed write leaves the old file intact.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }
}

/// Percent-encodes everything outside `[A-Za-z0-9_-]` so distinct keys map to
/// distinct file names.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn write_atomically(dir: &Path, target: &Path, value: &[u8]) -> Result<(), StorageError> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(value)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target)?;
    Ok(())
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let dir = self.root.clone();
        let target = self.path_for(key);
        debug!("Writing {} bytes to {}", value.len(), target.display());
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, value.as_bytes()))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_keeps_keys_distinct() {
        assert_eq!(encode_key("resumes:alice"), "resumes%3Aalice");
        assert_ne!(encode_key("resumes:a_b"), encode_key("resumes:a:b"));
        assert_eq!(encode_key("../etc"), "%2E%2E%2Fetc");
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(storage.get("resumes:alice").await.unwrap().is_none());
        storage
            .set("resumes:alice", "[1,2,3]".to_string())
            .await
            .unwrap();
        assert_eq!(
            storage.get("resumes:alice").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn test_file_storage_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set("k", "a".to_string()).await.unwrap();
        storage.set("k", "b".to_string()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }
}
