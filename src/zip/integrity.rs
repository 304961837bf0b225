//! Checksum verification and content decoding.

use crate::error::{Result, ZipError};

use super::encoding::TextEncoding;
use super::structures::CentralDirectoryEntry;

/// What form extracted content takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// Raw bytes, no decoding.
    #[default]
    Bytes,
    /// Text decoded with the given encoding.
    Text(TextEncoding),
}

/// Content of an extracted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Text(s) => s.as_bytes(),
            EntryContent::Bytes(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntryContent::Text(s) => Some(s),
            EntryContent::Bytes(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            EntryContent::Text(s) => s.into_bytes(),
            EntryContent::Bytes(b) => b,
        }
    }
}

/// Compare the CRC-32 of decoded data with the Central Directory value.
pub fn verify_crc32(entry: &CentralDirectoryEntry, data: &[u8]) -> Result<()> {
    let actual = crc32fast::hash(data);
    if actual != entry.crc32 {
        return Err(ZipError::Integrity {
            name: entry.file_name.clone(),
            expected: entry.crc32,
            actual,
        });
    }
    Ok(())
}

/// Turn verified bytes into the content form the caller asked for.
pub fn decode_content(name: &str, data: Vec<u8>, mode: ContentMode) -> Result<EntryContent> {
    match mode {
        ContentMode::Bytes => Ok(EntryContent::Bytes(data)),
        ContentMode::Text(encoding) => encoding.decode(name, data).map(EntryContent::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::zip::CompressionMethod;

    fn entry(crc32: u32) -> CentralDirectoryEntry {
        CentralDirectoryEntry {
            raw_name: b"notes.txt".to_vec(),
            file_name: "notes.txt".into(),
            flags: 0,
            compression_method: CompressionMethod::Stored,
            compressed_size: 5,
            uncompressed_size: 5,
            crc32,
            lfh_offset: 0,
            last_mod_time: 0,
            last_mod_date: 0,
            is_directory: false,
        }
    }

    #[test]
    fn crc_match_and_mismatch() {
        let good = entry(crc32fast::hash(b"hello"));
        verify_crc32(&good, b"hello").unwrap();

        let err = verify_crc32(&good, b"hellp").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert_eq!(err.entry_name(), Some("notes.txt"));
    }

    #[test]
    fn content_modes() {
        let bytes = decode_content("a", vec![0xFF, 0x00], ContentMode::Bytes).unwrap();
        assert_eq!(bytes, EntryContent::Bytes(vec![0xFF, 0x00]));
        assert_eq!(bytes.as_text(), None);

        let text = decode_content("a", b"hi".to_vec(), ContentMode::Text(TextEncoding::Utf8))
            .unwrap();
        assert_eq!(text.as_text(), Some("hi"));
        assert_eq!(text.len(), 2);

        let err = decode_content("a", vec![0xFF], ContentMode::Text(TextEncoding::Utf8))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }
}
