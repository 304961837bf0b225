use crate::error::{Result, ZipError};
use crate::io::ArchiveBytes;

use super::structures::{CentralDirectoryEntry, LFH_SIZE, LocalFileHeader};

/// Decodes the payload of individual archive members.
pub struct MemberDecoder<'a> {
    bytes: &'a ArchiveBytes,
}

impl<'a> MemberDecoder<'a> {
    pub fn new(bytes: &'a ArchiveBytes) -> Self {
        Self { bytes }
    }

    /// Read and validate the Local File Header of `entry`.
    ///
    /// The method must match the Central Directory. Sizes must match too,
    /// unless the local header defers them (data descriptor, zeroed sizes or
    /// ZIP64 sentinels), in which case the Central Directory values are used.
    pub fn local_header(&self, entry: &CentralDirectoryEntry) -> Result<LocalFileHeader> {
        let buf = self
            .bytes
            .range(entry.lfh_offset, LFH_SIZE as u64, "Local File Header")?;
        let lfh = LocalFileHeader::from_bytes(buf).map_err(|_| {
            ZipError::malformed_entry(
                &entry.file_name,
                format!("no Local File Header at offset {}", entry.lfh_offset),
            )
        })?;

        if lfh.compression_method != entry.compression_method {
            return Err(ZipError::malformed_entry(
                &entry.file_name,
                format!(
                    "local header declares compression method {} but central directory declares {}",
                    lfh.compression_method.as_u16(),
                    entry.compression_method.as_u16()
                ),
            ));
        }

        if !lfh.sizes_deferred()
            && (lfh.compressed_size as u64 != entry.compressed_size
                || lfh.uncompressed_size as u64 != entry.uncompressed_size)
        {
            return Err(ZipError::malformed_entry(
                &entry.file_name,
                format!(
                    "local header sizes {}/{} disagree with central directory sizes {}/{}",
                    lfh.compressed_size,
                    lfh.uncompressed_size,
                    entry.compressed_size,
                    entry.uncompressed_size
                ),
            ));
        }

        Ok(lfh)
    }

    /// Borrow the compressed bytes of `entry`.
    pub fn payload(&self, entry: &CentralDirectoryEntry) -> Result<&'a [u8]> {
        let lfh = self.local_header(entry)?;
        let data_offset = entry
            .lfh_offset
            .checked_add(lfh.data_offset())
            .ok_or_else(|| ZipError::malformed_entry(&entry.file_name, "data offset overflows"))?;

        self.bytes
            .range(data_offset, entry.compressed_size, "entry data")
            .map_err(|_| {
                ZipError::malformed_entry(
                    &entry.file_name,
                    format!(
                        "{} bytes of data at offset {} extend past end of archive",
                        entry.compressed_size, data_offset
                    ),
                )
            })
    }

    /// Decompress `entry` into exactly `uncompressed_size` bytes.
    ///
    /// The checksum only classifies a deflate length mismatch here; the
    /// output is verified by [`verify_crc32`](super::verify_crc32).
    pub fn decode(&self, entry: &CentralDirectoryEntry) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            return Err(ZipError::Encrypted {
                name: entry.file_name.clone(),
            });
        }
        if !entry.compression_method.is_supported() {
            return Err(ZipError::UnsupportedCompression {
                name: entry.file_name.clone(),
                method: entry.compression_method.as_u16(),
            });
        }

        let data = self.payload(entry)?;
        entry
            .compression_method
            .decompress(&entry.file_name, data, entry.uncompressed_size, entry.crc32)
    }
}
