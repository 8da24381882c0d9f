//! File sources
//!
//! A file is known by the name the user picked and content that is read
//! lazily. Reading is the only I/O either side performs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::crypto::{ContentHash, CryptoError, CryptoResult, Hash};

/// A file selected by the user
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Name of the file, without directories
    fn name(&self) -> &str;

    /// Read the full content
    async fn read(&self) -> CryptoResult<Vec<u8>>;

    /// Read and hash the content
    async fn content_hash(&self) -> CryptoResult<ContentHash> {
        let bytes = self.read().await?;
        Hash::content_hash(bytes).await
    }
}

/// A file on local disk
#[derive(Clone, Debug)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
}

impl DiskFile {
    /// Refer to a file by path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        DiskFile { path, name }
    }

    /// Path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> CryptoResult<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| CryptoError::ReadFailed(format!("{}: {}", self.path.display(), e)))
    }
}

/// A file held in memory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryFile {
    name: String,
    content: Vec<u8>,
}

impl MemoryFile {
    /// Create from name and content
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        MemoryFile {
            name: name.into(),
            content: content.into(),
        }
    }

    /// The content
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> CryptoResult<Vec<u8>> {
        Ok(self.content.clone())
    }
}
