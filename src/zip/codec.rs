//! Payload decompression, dispatched on the entry's compression method.

use flate2::read::DeflateDecoder;
use std::io::Read;

use super::structures::CompressionMethod;
use crate::error::{Result, ZipError};

impl CompressionMethod {
    /// Decompress `data` into exactly `expected_size` bytes.
    ///
    /// `name` identifies the entry in error messages. A stored payload of the
    /// wrong length is a [`ZipError::MalformedEntry`]. A deflate stream that
    /// inflates to the wrong length is a [`ZipError::CorruptPayload`], unless
    /// its output still matches `expected_crc`, in which case the declared
    /// size is what is wrong and the entry is malformed.
    pub fn decompress(
        &self,
        name: &str,
        data: &[u8],
        expected_size: u64,
        expected_crc: u32,
    ) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::Stored => {
                if data.len() as u64 != expected_size {
                    return Err(ZipError::malformed_entry(
                        name,
                        format!(
                            "stored data is {} bytes, expected {expected_size}",
                            data.len()
                        ),
                    ));
                }
                Ok(data.to_vec())
            }
            CompressionMethod::Deflate => inflate(name, data, expected_size, expected_crc),
            CompressionMethod::Unknown(method) => Err(ZipError::UnsupportedCompression {
                name: name.to_string(),
                method: *method,
            }),
        }
    }
}

/// Inflate a raw deflate stream.
///
/// At most `expected_size` bytes are kept. Anything the stream yields past
/// that is only counted and hashed, so an overlong stream never grows the
/// output buffer.
fn inflate(name: &str, data: &[u8], expected_size: u64, expected_crc: u32) -> Result<Vec<u8>> {
    let corrupt = |e: std::io::Error| ZipError::CorruptPayload {
        name: name.to_string(),
        reason: e.to_string(),
    };

    let capacity = expected_size.min(data.len() as u64 * 4 + 1024) as usize;
    let mut out = Vec::with_capacity(capacity);
    let mut decoder = DeflateDecoder::new(data);
    (&mut decoder)
        .take(expected_size)
        .read_to_end(&mut out)
        .map_err(corrupt)?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&out);
    let mut actual = out.len() as u64;
    let mut chunk = [0u8; 8192];
    loop {
        let n = decoder.read(&mut chunk).map_err(corrupt)?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
        actual += n as u64;
    }

    if actual == expected_size {
        return Ok(out);
    }

    if hasher.finalize() == expected_crc {
        Err(ZipError::malformed_entry(
            name,
            format!("decompressed to {actual} bytes, declared size is {expected_size}"),
        ))
    } else {
        Err(ZipError::CorruptPayload {
            name: name.to_string(),
            reason: format!("inflated to {actual} bytes, expected {expected_size}"),
        })
    }
}
