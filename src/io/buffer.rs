use std::ops::Deref;

use crate::error::{Result, ZipError};

/// The complete archive held in memory.
///
/// Created once by a [`ByteSource`](super::ByteSource) and never mutated
/// afterwards. All ranged access goes through [`range`](Self::range), which
/// turns out-of-bounds reads into [`ZipError::Malformed`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBytes {
    data: Box<[u8]>,
}

impl ArchiveBytes {
    pub fn new(data: impl Into<Box<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// `what` names the structure being read and ends up in the error message.
    pub fn range(&self, offset: u64, len: u64, what: &str) -> Result<&[u8]> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.len())
            .ok_or_else(|| {
                ZipError::malformed(format!(
                    "{what} at offset {offset} ({len} bytes) extends past end of archive ({} bytes)",
                    self.len()
                ))
            })?;
        Ok(&self.data[offset as usize..end as usize])
    }

    /// Borrow everything from `offset` to the end of the archive.
    pub fn tail(&self, offset: u64, what: &str) -> Result<&[u8]> {
        let len = self.len().checked_sub(offset).ok_or_else(|| {
            ZipError::malformed(format!(
                "{what} offset {offset} is past end of archive ({} bytes)",
                self.len()
            ))
        })?;
        self.range(offset, len, what)
    }
}

impl Deref for ArchiveBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for ArchiveBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<Box<[u8]>> for ArchiveBytes {
    fn from(data: Box<[u8]>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for ArchiveBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}
