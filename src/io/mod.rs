//! Byte sources: where archive bytes come from.
//!
//! Every source is consumed by [`ByteSource::read_all`], which resolves
//! exactly once with either the complete archive or an I/O error. This is
//! the only place extraction awaits anything.

mod buffer;
mod http;
mod local;
mod memory;

pub use buffer::ArchiveBytes;
pub use http::HttpSource;
pub use local::LocalFileSource;
pub use memory::MemorySource;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for sources that can materialize a whole archive in memory
#[async_trait]
pub trait ByteSource: Send {
    /// Read the entire source into an [`ArchiveBytes`] buffer
    async fn read_all(self) -> Result<ArchiveBytes>;
}

#[async_trait]
impl ByteSource for ArchiveBytes {
    async fn read_all(self) -> Result<ArchiveBytes> {
        Ok(self)
    }
}

#[async_trait]
impl ByteSource for Vec<u8> {
    async fn read_all(self) -> Result<ArchiveBytes> {
        Ok(ArchiveBytes::from(self))
    }
}
