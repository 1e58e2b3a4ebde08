use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Files relative to a base directory; parent directories are created on write.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

/// Keeps everything in memory; used when documents go back to the caller instead of
/// onto disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I>(files: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        Self {
            files: Arc::new(Mutex::new(files.into_iter().collect())),
        }
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }

    /// Drains every stored file, in path order.
    pub async fn take_files(&self) -> Vec<(String, Vec<u8>)> {
        std::mem::take(&mut *self.files.lock().await)
            .into_iter()
            .collect()
    }
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| {
            EtlError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_creates_region_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("NORTE/doc.xlsx", b"data").await.unwrap();

        assert!(temp_dir.path().join("NORTE").join("doc.xlsx").exists());
        assert_eq!(storage.read_file("NORTE/doc.xlsx").await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_memory_storage_round_trip_and_take() {
        let storage = MemoryStorage::new();
        storage.write_file("b.xlsx", b"2").await.unwrap();
        storage.write_file("a.xlsx", b"1").await.unwrap();

        assert!(storage.read_file("missing.xlsx").await.is_err());
        let files = storage.take_files().await;
        assert_eq!(files[0].0, "a.xlsx");
        assert_eq!(files.len(), 2);
        assert!(storage.get_file("a.xlsx").await.is_none());
    }
}
