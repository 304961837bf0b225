//! Error types for archive extraction.
//!
//! Every internal failure is a [`ZipError`]. Each variant belongs to one of
//! five [`ErrorKind`]s, which is what callers usually branch on. At the
//! outward boundary the orchestrator wraps the cause in an
//! [`ExtractionError`], which carries one stable summary message for
//! presentation layers while keeping the structured cause for logging.
//!
//! ```
//! use memzip::{ErrorKind, extract_bytes};
//!
//! let err = extract_bytes(b"definitely not a zip".to_vec()).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MalformedArchive);
//! println!("{err}: {}", err.cause());
//! ```

use std::fmt;
use std::io;
use std::str::Utf8Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ZipError> = std::result::Result<T, E>;

/// Summary carried by every [`ExtractionError`].
pub const EXTRACTION_FAILED: &str = "Failed to extract archive contents";

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The byte source could not be read.
    Io,
    /// The archive structure is invalid.
    MalformedArchive,
    /// An entry uses a compression method (or encryption) this engine cannot decode.
    UnsupportedCompression,
    /// Decoded data does not match its checksum, or the payload is corrupt.
    Integrity,
    /// Entry content is not valid text in the requested encoding.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Io => "I/O error",
            Self::MalformedArchive => "malformed archive",
            Self::UnsupportedCompression => "unsupported compression",
            Self::Integrity => "integrity error",
            Self::Encoding => "encoding error",
        };
        f.write_str(s)
    }
}

/// A failure raised by one of the extraction stages.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ZipError {
    #[error("failed to read archive source: {0}")]
    Io(#[from] io::Error),

    #[error("malformed archive: {0}")]
    Malformed(String),

    #[error("malformed entry {name:?}: {reason}")]
    MalformedEntry { name: String, reason: String },

    #[error("entry {name:?} uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },

    #[error("entry {name:?} is encrypted")]
    Encrypted { name: String },

    #[error("CRC-32 mismatch in entry {name:?}: expected {expected:#010x}, got {actual:#010x}")]
    Integrity {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("corrupt compressed data in entry {name:?}: {reason}")]
    CorruptPayload { name: String, reason: String },

    #[error("entry {name:?} is not valid UTF-8 text")]
    Encoding {
        name: String,
        #[source]
        source: Utf8Error,
    },
}

impl ZipError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    pub(crate) fn malformed_entry(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Malformed(_) | Self::MalformedEntry { .. } => ErrorKind::MalformedArchive,
            Self::UnsupportedCompression { .. } | Self::Encrypted { .. } => {
                ErrorKind::UnsupportedCompression
            }
            Self::Integrity { .. } | Self::CorruptPayload { .. } => ErrorKind::Integrity,
            Self::Encoding { .. } => ErrorKind::Encoding,
        }
    }

    /// Name of the entry that caused the failure, if it is tied to one.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Self::Io(_) | Self::Malformed(_) => None,
            Self::MalformedEntry { name, .. }
            | Self::UnsupportedCompression { name, .. }
            | Self::Encrypted { name }
            | Self::Integrity { name, .. }
            | Self::CorruptPayload { name, .. }
            | Self::Encoding { name, .. } => Some(name),
        }
    }
}

/// The single outward-facing error returned by an extraction.
///
/// `Display` yields the stable [`EXTRACTION_FAILED`] summary; the structured
/// cause is available through [`cause`](Self::cause) and
/// [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("{summary}")]
pub struct ExtractionError {
    summary: &'static str,
    #[source]
    cause: ZipError,
}

impl ExtractionError {
    pub fn new(cause: ZipError) -> Self {
        Self {
            summary: EXTRACTION_FAILED,
            cause,
        }
    }

    pub fn summary(&self) -> &str {
        self.summary
    }

    pub fn cause(&self) -> &ZipError {
        &self.cause
    }

    pub fn into_cause(self) -> ZipError {
        self.cause
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }

    pub fn entry_name(&self) -> Option<&str> {
        self.cause.entry_name()
    }
}

impl From<ZipError> for ExtractionError {
    fn from(cause: ZipError) -> Self {
        Self::new(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kinds_cover_taxonomy() {
        let io = ZipError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(io.entry_name(), None);

        let enc = ZipError::Encrypted {
            name: "secret.txt".into(),
        };
        assert_eq!(enc.kind(), ErrorKind::UnsupportedCompression);
        assert_eq!(enc.entry_name(), Some("secret.txt"));

        let corrupt = ZipError::CorruptPayload {
            name: "a.bin".into(),
            reason: "bad block".into(),
        };
        assert_eq!(corrupt.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn extraction_error_keeps_cause() {
        let err = ExtractionError::new(ZipError::UnsupportedCompression {
            name: "data.bz2".into(),
            method: 12,
        });
        assert_eq!(err.to_string(), EXTRACTION_FAILED);
        assert_eq!(err.kind(), ErrorKind::UnsupportedCompression);
        assert_eq!(err.entry_name(), Some("data.bz2"));

        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("method 12"), "{source}");
    }

    #[test]
    fn integrity_message_shows_both_checksums() {
        let err = ZipError::Integrity {
            name: "x".into(),
            expected: 0xdeadbeef,
            actual: 0x1,
        };
        let msg = err.to_string();
        assert!(msg.contains("0xdeadbeef"));
        assert!(msg.contains("0x00000001"));
    }
}
