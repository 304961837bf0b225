//! Central Directory reader.
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the buffer's end
//! 2. If ZIP64, read the ZIP64 EOCD for the 64-bit counts and offsets
//! 3. Parse every Central Directory File Header into a [`CentralDirectoryEntry`]
//!
//! Every offset and length read from the archive is checked against the
//! buffer before it is used.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use super::encoding::{NameEncoding, decode_name};
use super::structures::*;
use crate::error::{Result, ZipError};
use crate::io::ArchiveBytes;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Location of the Central Directory as announced by the (ZIP64) EOCD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryLocation {
    pub cd_offset: u64,
    pub cd_size: u64,
    pub total_entries: u64,
    /// Offset of the classic EOCD record
    pub eocd_offset: u64,
}

/// Reads the catalog of members out of an in-memory archive.
pub struct IndexReader<'a> {
    bytes: &'a ArchiveBytes,
    name_encoding: NameEncoding,
}

impl<'a> IndexReader<'a> {
    pub fn new(bytes: &'a ArchiveBytes, name_encoding: NameEncoding) -> Self {
        Self {
            bytes,
            name_encoding,
        }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Tries the common case of an archive without comment first, then
    /// searches backwards through the largest window a comment can occupy.
    /// A candidate is only accepted when its comment length reaches exactly
    /// to the end of the archive, so a stray signature inside a comment is
    /// not mistaken for the record.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let size = self.bytes.len();
        let record = EndOfCentralDirectory::SIZE as u64;

        if size < record {
            return Err(ZipError::malformed(format!(
                "archive is {size} bytes, too small to hold an End of Central Directory record"
            )));
        }

        let offset = size - record;
        let buf = self.bytes.range(offset, record, "End of Central Directory")?;
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && buf[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(buf)?, offset));
        }

        let search_size = (MAX_COMMENT_SIZE + record).min(size);
        let search_start = size - search_size;
        let buf = self.bytes.tail(search_start, "End of Central Directory search window")?;

        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        Err(ZipError::malformed("End of Central Directory record not found"))
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// The ZIP64 locator sits immediately before the classic EOCD and points
    /// at the ZIP64 record.
    pub fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .ok_or_else(|| ZipError::malformed("ZIP64 locator missing before EOCD"))?;
        let locator = Zip64EOCDLocator::from_bytes(self.bytes.range(
            locator_offset,
            Zip64EOCDLocator::SIZE as u64,
            "ZIP64 EOCD locator",
        )?)?;

        if locator.total_disks > 1 {
            return Err(ZipError::malformed("multi-disk archives are not supported"));
        }

        Zip64EOCD::from_bytes(self.bytes.range(
            locator.eocd64_offset,
            Zip64EOCD::MIN_SIZE as u64,
            "ZIP64 EOCD",
        )?)
    }

    /// Locate the Central Directory, resolving ZIP64 values when needed.
    pub fn locate_directory(&self) -> Result<DirectoryLocation> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let location = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            if eocd64.disk_number != 0 || eocd64.disk_with_cd != 0 {
                return Err(ZipError::malformed("multi-disk archives are not supported"));
            }
            DirectoryLocation {
                cd_offset: eocd64.cd_offset,
                cd_size: eocd64.cd_size,
                total_entries: eocd64.total_entries,
                eocd_offset,
            }
        } else {
            if eocd.disk_number != 0 || eocd.disk_with_cd != 0 {
                return Err(ZipError::malformed("multi-disk archives are not supported"));
            }
            DirectoryLocation {
                cd_offset: eocd.cd_offset as u64,
                cd_size: eocd.cd_size as u64,
                total_entries: eocd.total_entries as u64,
                eocd_offset,
            }
        };

        log::debug!(
            "EOCD at {}: {} entries, central directory at {} ({} bytes)",
            location.eocd_offset,
            location.total_entries,
            location.cd_offset,
            location.cd_size
        );

        Ok(location)
    }

    /// Parse the whole Central Directory.
    ///
    /// Returns one entry per record, in the order they are stored, including
    /// directory placeholders.
    pub fn read_entries(&self) -> Result<Vec<CentralDirectoryEntry>> {
        let location = self.locate_directory()?;

        let cd_data = self
            .bytes
            .range(location.cd_offset, location.cd_size, "Central Directory")?;

        // Each record takes at least CDFH_MIN_SIZE bytes, which bounds the
        // allocation for a lying entry count.
        let max_records = cd_data.len() / CDFH_MIN_SIZE;
        let mut entries = Vec::with_capacity((location.total_entries as usize).min(max_records));
        let mut cursor = Cursor::new(cd_data);

        while remaining(&cursor) >= 4 {
            let pos = cursor.position() as usize;
            if &cd_data[pos..pos + 4] != CDFH_SIGNATURE {
                break;
            }
            let entry = self.parse_cdfh(&mut cursor, entries.len())?;
            log::trace!(
                "entry {}: {:?} method={} csize={} usize={} offset={}",
                entries.len(),
                entry.file_name,
                entry.compression_method.as_u16(),
                entry.compressed_size,
                entry.uncompressed_size,
                entry.lfh_offset
            );
            entries.push(entry);
        }

        if entries.len() as u64 != location.total_entries {
            return Err(ZipError::malformed(format!(
                "End of Central Directory declares {} entries but {} were found",
                location.total_entries,
                entries.len()
            )));
        }

        Ok(entries)
    }

    /// Parse a Central Directory File Header from a cursor.
    fn parse_cdfh(
        &self,
        cursor: &mut Cursor<&[u8]>,
        index: usize,
    ) -> Result<CentralDirectoryEntry> {
        if remaining(cursor) < CDFH_MIN_SIZE as u64 {
            return Err(ZipError::malformed(format!(
                "Central Directory record {index} is truncated"
            )));
        }

        // The signature has already been checked by the caller
        cursor.set_position(cursor.position() + 4);

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;
        let file_comment_length = cursor.read_u16::<LittleEndian>()? as u64;
        let disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

        if remaining(cursor) < file_name_length + extra_field_length + file_comment_length {
            return Err(ZipError::malformed(format!(
                "Central Directory record {index} is truncated"
            )));
        }

        let mut raw_name = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut raw_name)?;

        if raw_name.is_empty() {
            return Err(ZipError::malformed(format!(
                "Central Directory record {index} has an empty file name"
            )));
        }

        let mut file_name = decode_name(&raw_name, flags, self.name_encoding);

        // Walk the extra field blocks
        let extra_field_end = cursor.position() + extra_field_length;

        while cursor.position() + 4 <= extra_field_end {
            let header_id = cursor.read_u16::<LittleEndian>()?;
            let field_size = cursor.read_u16::<LittleEndian>()? as u64;
            let field_end = (cursor.position() + field_size).min(extra_field_end);

            match header_id {
                EXTRA_ZIP64 => {
                    // Fields are present only if the corresponding header field is saturated
                    if uncompressed_size == ZIP64_SENTINEL_U32 as u64
                        && cursor.position() + 8 <= field_end
                    {
                        uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                    }
                    if compressed_size == ZIP64_SENTINEL_U32 as u64
                        && cursor.position() + 8 <= field_end
                    {
                        compressed_size = cursor.read_u64::<LittleEndian>()?;
                    }
                    if lfh_offset == ZIP64_SENTINEL_U32 as u64 && cursor.position() + 8 <= field_end
                    {
                        lfh_offset = cursor.read_u64::<LittleEndian>()?;
                    }
                }
                EXTRA_UNICODE_PATH if flags & FLAG_UTF8 == 0 => {
                    let start = cursor.position() as usize;
                    let block = &cursor.get_ref()[start..field_end as usize];
                    if let Some(name) = unicode_path(block, &raw_name) {
                        file_name = name;
                    }
                }
                _ => {}
            }

            cursor.set_position(field_end);
        }

        // Skip anything left in the extra field, then the file comment
        cursor.set_position(extra_field_end + file_comment_length);

        if disk_number_start != 0 && disk_number_start != ZIP64_SENTINEL_U16 {
            return Err(ZipError::malformed_entry(
                &file_name,
                "entry starts on another disk",
            ));
        }

        let header_end = lfh_offset.checked_add(LFH_SIZE as u64);
        if header_end.is_none_or(|end| end > self.bytes.len()) {
            return Err(ZipError::malformed_entry(
                &file_name,
                format!("local header offset {lfh_offset} is outside the archive"),
            ));
        }
        if compressed_size > self.bytes.len() {
            return Err(ZipError::malformed_entry(
                &file_name,
                format!("compressed size {compressed_size} exceeds archive size"),
            ));
        }

        let is_directory =
            (file_name.ends_with('/') || file_name.ends_with('\\')) && uncompressed_size == 0;

        Ok(CentralDirectoryEntry {
            raw_name,
            file_name,
            flags,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
            lfh_offset,
            last_mod_time,
            last_mod_date,
            is_directory,
        })
    }
}

fn remaining(cursor: &Cursor<&[u8]>) -> u64 {
    (cursor.get_ref().len() as u64).saturating_sub(cursor.position())
}

/// Decode an Info-ZIP Unicode Path extra block.
///
/// The block is only trusted when its CRC-32 matches the raw header name,
/// otherwise the name was changed by a tool that did not update the block.
fn unicode_path(block: &[u8], raw_name: &[u8]) -> Option<String> {
    let (&version, rest) = block.split_first()?;
    if version != 1 || rest.len() < 4 {
        return None;
    }
    let name_crc = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
    if name_crc != crc32fast::hash(raw_name) {
        return None;
    }
    String::from_utf8(rest[4..].to_vec()).ok()
}
