use super::{ArchiveBytes, ByteSource};
use crate::error::Result;
use async_trait::async_trait;

/// An archive that is already in memory, e.g. a blob handed over by a caller
pub struct MemorySource {
    data: Box<[u8]>,
}

impl MemorySource {
    pub fn new(data: impl Into<Box<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn read_all(self) -> Result<ArchiveBytes> {
        Ok(ArchiveBytes::from(self.data))
    }
}
