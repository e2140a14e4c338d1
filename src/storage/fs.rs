//! Filesystem Durable Backend
//!
//! Stores each durable entry as one JSON file under a data directory.
//! Filenames are the hex-encoded key bytes, so arbitrary keys (including
//! the namespace separator) map to safe file names and back.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use crate::error::{CacheError, Result};
use crate::storage::DurableStore;

const FILE_EXTENSION: &str = "json";

// == Fs Backend ==
/// File-per-key implementation of [`DurableStore`].
#[derive(Debug, Clone)]
pub struct FsBackend {
    /// Directory holding one file per durable key
    dir: PathBuf,
}

impl FsBackend {
    /// Creates a backend rooted at `dir`. The directory is created on the
    /// first write if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", hex_encode(key), FILE_EXTENSION))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(io_error)
    }
}

fn io_error(err: io::Error) -> CacheError {
    CacheError::StorageUnavailable(err.to_string())
}

// == Filename Encoding ==
/// Hex-encodes a key into a filesystem-safe name.
fn hex_encode(key: &str) -> String {
    key.bytes().map(|b| format!("{:02x}", b)).collect()
}

/// Reverses [`hex_encode`]; returns None for names this backend did not
/// produce (odd length, non-hex, or non-UTF-8 content).
fn hex_decode(name: &str) -> Option<String> {
    if name.len() % 2 != 0 {
        return None;
    }
    let bytes: Option<Vec<u8>> = (0..name.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&name[i..i + 2], 16).ok())
        .collect();
    String::from_utf8(bytes?).ok()
}

#[async_trait]
impl DurableStore for FsBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool> {
        self.ensure_dir().await?;
        fs::write(self.path_for(key), value).await.map_err(io_error)?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(err)),
        };

        let mut keys = Vec::new();
        while let Some(dent) = dir.next_entry().await.map_err(io_error)? {
            let Some(key) = decode_file_name(&dent.path()) else {
                warn!(path = %dent.path().display(), "skipping unrecognized file in data dir");
                continue;
            };
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

fn decode_file_name(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != FILE_EXTENSION {
        return None;
    }
    hex_decode(path.file_stem()?.to_str()?)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_backend(tag: &str) -> FsBackend {
        let dir = std::env::temp_dir().join(format!("tiercache-fs-{}-{}", tag, std::process::id()));
        FsBackend::new(dir)
    }

    #[test]
    fn test_hex_round_trip() {
        for key in ["plain", "tiercache:user:1", "spaces and unicode é"] {
            assert_eq!(hex_decode(&hex_encode(key)).as_deref(), Some(key));
        }
    }

    #[test]
    fn test_hex_decode_rejects_garbage() {
        assert!(hex_decode("zz").is_none());
        assert!(hex_decode("abc").is_none());
    }

    #[tokio::test]
    async fn test_set_get_delete_round_trip() {
        let backend = temp_backend("roundtrip");

        assert!(backend.set("tiercache:k1", "payload").await.unwrap());
        assert_eq!(
            backend.get("tiercache:k1").await.unwrap(),
            Some("payload".to_string())
        );

        backend.delete("tiercache:k1").await.unwrap();
        assert_eq!(backend.get("tiercache:k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let backend = temp_backend("missing");
        assert_eq!(backend.get("tiercache:none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let backend = temp_backend("delete-missing");
        assert!(backend.delete("tiercache:none").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_keys_filters_by_prefix() {
        let backend = temp_backend("list");
        let _ = fs::remove_dir_all(&backend.dir).await;
        backend.set("tiercache:a", "1").await.unwrap();
        backend.set("tiercache:b", "2").await.unwrap();
        backend.set("unrelated:c", "3").await.unwrap();

        let mut keys = backend.list_keys("tiercache:").await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec!["tiercache:a".to_string(), "tiercache:b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_keys_on_missing_dir_is_empty() {
        let backend = FsBackend::new("/nonexistent/tiercache-test-dir");
        assert!(backend.list_keys("tiercache:").await.unwrap().is_empty());
    }
}
