//! Shared test utilities for integration tests.
//!
//! `ZipBuilder` writes real ZIP archives into memory so tests can control
//! every header field, including the broken ones.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;
pub const FLAG_UTF8: u16 = 1 << 11;

/// One member to be written by [`ZipBuilder`].
#[derive(Clone)]
pub struct EntrySpec {
    pub name: Vec<u8>,
    pub data: Vec<u8>,
    /// Compression method code written to both headers.
    pub method: u16,
    /// Bytes written as the payload; `None` compresses `data` according to `method`.
    pub payload: Option<Vec<u8>>,
    pub flags: u16,
    pub crc_override: Option<u32>,
    pub extra: Vec<u8>,
}

impl EntrySpec {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            data: data.to_vec(),
            method: 0,
            payload: None,
            flags: 0,
            crc_override: None,
            extra: Vec::new(),
        }
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        Self {
            method: 8,
            ..Self::stored(name, data)
        }
    }

    pub fn directory(name: &str) -> Self {
        Self::stored(name, b"")
    }

    pub fn method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags |= flags;
        self
    }

    pub fn raw_name(mut self, name: &[u8]) -> Self {
        self.name = name.to_vec();
        self
    }

    pub fn crc(mut self, crc: u32) -> Self {
        self.crc_override = Some(crc);
        self
    }

    pub fn extra(mut self, extra: &[u8]) -> Self {
        self.extra = extra.to_vec();
        self
    }

    fn payload_bytes(&self) -> Vec<u8> {
        if let Some(payload) = &self.payload {
            return payload.clone();
        }
        match self.method {
            8 => deflate(&self.data),
            _ => self.data.clone(),
        }
    }
}

/// Layout information about a built archive.
pub struct Built {
    pub bytes: Vec<u8>,
    /// Offset of each entry's payload within `bytes`.
    pub payload_offsets: Vec<usize>,
    /// Offset of each entry's Local File Header.
    pub header_offsets: Vec<usize>,
    pub cd_offset: usize,
    pub eocd_offset: usize,
}

#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<EntrySpec>,
    comment: Vec<u8>,
    declared_entries: Option<u16>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, spec: EntrySpec) -> Self {
        self.entries.push(spec);
        self
    }

    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.entry(EntrySpec::stored(name, data))
    }

    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.entry(EntrySpec::deflated(name, data))
    }

    pub fn directory(self, name: &str) -> Self {
        self.entry(EntrySpec::directory(name))
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Lie about the entry count in the EOCD.
    pub fn declared_entries(mut self, count: u16) -> Self {
        self.declared_entries = Some(count);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().bytes
    }

    pub fn build_with_layout(&self) -> Built {
        let mut out = Vec::new();
        let mut cd = Vec::new();
        let mut payload_offsets = Vec::new();
        let mut header_offsets = Vec::new();

        for spec in &self.entries {
            let payload = spec.payload_bytes();
            let crc = spec.crc_override.unwrap_or_else(|| crc32fast::hash(&spec.data));
            let csize = payload.len() as u32;
            let usize_ = spec.data.len() as u32;
            let descriptor = spec.flags & FLAG_DATA_DESCRIPTOR != 0;
            let offset = out.len();
            header_offsets.push(offset);

            // Local File Header
            out.extend_from_slice(b"PK\x03\x04");
            put_u16(&mut out, 20);
            put_u16(&mut out, spec.flags);
            put_u16(&mut out, spec.method);
            put_u16(&mut out, 0x6000); // 12:00
            put_u16(&mut out, 0x5821); // 2024-01-01
            if descriptor {
                put_u32(&mut out, 0);
                put_u32(&mut out, 0);
                put_u32(&mut out, 0);
            } else {
                put_u32(&mut out, crc);
                put_u32(&mut out, csize);
                put_u32(&mut out, usize_);
            }
            put_u16(&mut out, spec.name.len() as u16);
            put_u16(&mut out, 0);
            out.extend_from_slice(&spec.name);
            payload_offsets.push(out.len());
            out.extend_from_slice(&payload);

            if descriptor {
                out.extend_from_slice(b"PK\x07\x08");
                put_u32(&mut out, crc);
                put_u32(&mut out, csize);
                put_u32(&mut out, usize_);
            }

            // Central Directory File Header
            cd.extend_from_slice(b"PK\x01\x02");
            put_u16(&mut cd, 20);
            put_u16(&mut cd, 20);
            put_u16(&mut cd, spec.flags);
            put_u16(&mut cd, spec.method);
            put_u16(&mut cd, 0x6000);
            put_u16(&mut cd, 0x5821);
            put_u32(&mut cd, crc);
            put_u32(&mut cd, csize);
            put_u32(&mut cd, usize_);
            put_u16(&mut cd, spec.name.len() as u16);
            put_u16(&mut cd, spec.extra.len() as u16);
            put_u16(&mut cd, 0);
            put_u16(&mut cd, 0);
            put_u16(&mut cd, 0);
            put_u32(&mut cd, 0);
            put_u32(&mut cd, offset as u32);
            cd.extend_from_slice(&spec.name);
            cd.extend_from_slice(&spec.extra);
        }

        let cd_offset = out.len();
        out.extend_from_slice(&cd);

        let eocd_offset = out.len();
        let count = self.declared_entries.unwrap_or(self.entries.len() as u16);
        out.extend_from_slice(b"PK\x05\x06");
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, count);
        put_u16(&mut out, count);
        put_u32(&mut out, cd.len() as u32);
        put_u32(&mut out, cd_offset as u32);
        put_u16(&mut out, self.comment.len() as u16);
        out.extend_from_slice(&self.comment);

        Built {
            bytes: out,
            payload_offsets,
            header_offsets,
            cd_offset,
            eocd_offset,
        }
    }
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Text that compresses well, so deflate actually kicks in.
pub fn sample_text() -> Vec<u8> {
    "The quick brown fox jumps over the lazy dog.\n"
        .repeat(64)
        .into_bytes()
}

/// Bytes that are not valid UTF-8.
pub fn sample_binary() -> Vec<u8> {
    (0..=255u8).cycle().take(1024).collect()
}
