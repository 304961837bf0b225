use super::{ArchiveBytes, ByteSource};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Archive stored in a local file, read in one go
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
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
impl ByteSource for LocalFileSource {
    async fn read_all(self) -> Result<ArchiveBytes> {
        let data = tokio::fs::read(&self.path).await?;
        log::debug!("read {} bytes from {}", data.len(), self.path.display());
        Ok(ArchiveBytes::from(data))
    }
}
