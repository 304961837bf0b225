//! # memzip
//!
//! Extracts the files of a ZIP archive entirely in memory.
//!
//! The archive is read from a [`ByteSource`] (an in-memory blob, a local
//! file or an HTTP URL) into one buffer. From there the Central Directory is
//! parsed, every member is decompressed and checked against its CRC-32, and
//! the files come back in archive order, directories omitted. Any failure
//! aborts the extraction and is reported as a single [`ExtractionError`].
//!
//! ## Features
//!
//! - STORED and DEFLATE members, ZIP64 archives
//! - Raw bytes or strict UTF-8 text output, chosen per extraction
//! - Legacy (CP437, Latin-1) name decoding for archives without the UTF-8 flag
//! - Structured errors: I/O, malformed archive, unsupported compression,
//!   integrity and encoding failures
//!
//! ## Example
//!
//! ```no_run
//! use memzip::{ExtractOptions, Extractor, LocalFileSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let extractor = Extractor::new(ExtractOptions::new().text());
//!     let files = extractor.extract(LocalFileSource::new("notes.zip")).await?;
//!
//!     for file in &files {
//!         println!("{}: {} bytes", file.name(), file.content().len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{ErrorKind, ExtractionError, Result, ZipError};
pub use io::{ArchiveBytes, ByteSource, HttpSource, LocalFileSource, MemorySource};
pub use zip::{
    CentralDirectoryEntry, ContentMode, EntryContent, ExtractOptions, ExtractedEntry,
    ExtractionState, Extractor, NameEncoding, TextEncoding, UnsupportedPolicy,
};

/// Extract every file from `source` with default options (raw bytes).
pub async fn extract<S: ByteSource>(source: S) -> Result<Vec<ExtractedEntry>, ExtractionError> {
    Extractor::default().extract(source).await
}

/// Extract every file from an archive already in memory, with default options.
pub fn extract_bytes(
    bytes: impl Into<ArchiveBytes>,
) -> Result<Vec<ExtractedEntry>, ExtractionError> {
    Extractor::default().extract_bytes(bytes)
}
