//! Byte sources for loading containers

use crate::error::{NrrdError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Trait for fetching the raw bytes of a container
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Read the whole container
    async fn read_all(&self) -> Result<Bytes>;

    /// Human-readable description of where the bytes come from
    fn describe(&self) -> String;
}

/// Container stored on the local file system
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ByteSource for FileSource {
    async fn read_all(&self) -> Result<Bytes> {
        let data = fs::read(&self.path).await.map_err(NrrdError::Io)?;
        Ok(Bytes::from(data))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Container already held in memory
pub struct MemorySource {
    bytes: Bytes,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn read_all(&self) -> Result<Bytes> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("<memory, {} bytes>", self.bytes.len())
    }
}
