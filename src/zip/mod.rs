//! ZIP archive parsing and extraction.
//!
//! Everything in this module works on an [`ArchiveBytes`](crate::io::ArchiveBytes)
//! buffer that already holds the whole archive, so parsing and decompression
//! are synchronous.
//!
//! ## Architecture
//!
//! - `structures`: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - `index`: Central Directory reader producing the catalog of members
//! - `decoder`: Local File Header validation and payload decompression
//! - `integrity`: CRC-32 verification and text decoding
//! - `extractor`: The orchestrator tying the stages together
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) and DEFLATE methods
//! - UTF-8 flagged names, Info-ZIP Unicode Path fields and legacy code pages
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod codec;
mod decoder;
mod encoding;
mod extractor;
mod index;
mod integrity;
mod structures;

pub use decoder::MemberDecoder;
pub use encoding::{NameEncoding, TextEncoding, decode_name};
pub use extractor::{
    ExtractOptions, ExtractedEntry, ExtractionState, Extractor, UnsupportedPolicy,
};
pub use index::{DirectoryLocation, IndexReader};
pub use integrity::{ContentMode, EntryContent, decode_content, verify_crc32};
pub use structures::*;
