//! Character encodings for entry names and text content.

use std::str::FromStr;

use super::structures::FLAG_UTF8;
use crate::error::{Result, ZipError};

/// How to decode entry names that are not flagged as UTF-8.
///
/// Archivers that predate the UTF-8 flag write names in whatever code page
/// the host used, so the caller gets to pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameEncoding {
    /// Decode as UTF-8, replacing invalid sequences.
    #[default]
    Utf8Lossy,
    /// IBM PC code page 437, the historical ZIP default.
    Cp437,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl NameEncoding {
    pub fn decode(&self, raw: &[u8]) -> String {
        match self {
            NameEncoding::Utf8Lossy => String::from_utf8_lossy(raw).into_owned(),
            NameEncoding::Cp437 => raw.iter().map(|&b| cp437_char(b)).collect(),
            NameEncoding::Latin1 => raw.iter().map(|&b| b as char).collect(),
        }
    }
}

impl FromStr for NameEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(NameEncoding::Utf8Lossy),
            "cp437" | "ibm437" | "dos" => Ok(NameEncoding::Cp437),
            "latin1" | "iso-8859-1" => Ok(NameEncoding::Latin1),
            other => Err(format!("unknown name encoding: {other}")),
        }
    }
}

/// Decode a raw entry name, honoring the UTF-8 flag before the fallback policy.
pub fn decode_name(raw: &[u8], flags: u16, fallback: NameEncoding) -> String {
    if flags & FLAG_UTF8 != 0 {
        String::from_utf8_lossy(raw).into_owned()
    } else {
        fallback.decode(raw)
    }
}

/// Character encoding applied to entry content in text mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// Strict UTF-8; invalid input is an error.
    #[default]
    Utf8,
    /// ISO-8859-1; never fails.
    Latin1,
}

impl TextEncoding {
    /// Decode entry content, failing with [`ZipError::Encoding`] on invalid input.
    pub fn decode(&self, name: &str, data: Vec<u8>) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(data).map_err(|e| ZipError::Encoding {
                name: name.to_string(),
                source: e.utf8_error(),
            }),
            TextEncoding::Latin1 => Ok(data.into_iter().map(|b| b as char).collect()),
        }
    }
}

fn cp437_char(b: u8) -> char {
    if b < 0x80 {
        b as char
    } else {
        CP437_HIGH[(b - 0x80) as usize]
    }
}

#[rustfmt::skip]
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn utf8_flag_wins_over_fallback() {
        let raw = "naïve.txt".as_bytes();
        assert_eq!(decode_name(raw, FLAG_UTF8, NameEncoding::Cp437), "naïve.txt");
        // Without the flag the same bytes go through the legacy code page.
        assert_eq!(decode_name(raw, 0, NameEncoding::Cp437), "na├»ve.txt");
    }

    #[test]
    fn legacy_code_pages() {
        let raw = [0x80, b'a', 0x81, 0xE1];
        assert_eq!(NameEncoding::Cp437.decode(&raw), "Çaüß");
        assert_eq!(NameEncoding::Latin1.decode(&[0xE9]), "é");
        assert_eq!(NameEncoding::Utf8Lossy.decode(&[b'x', 0xFF]), "x\u{FFFD}");
    }

    #[test]
    fn parse_name_encoding() {
        assert_eq!("CP437".parse::<NameEncoding>(), Ok(NameEncoding::Cp437));
        assert_eq!("utf-8".parse::<NameEncoding>(), Ok(NameEncoding::Utf8Lossy));
        assert!("ebcdic".parse::<NameEncoding>().is_err());
    }

    #[test]
    fn strict_utf8_text() {
        assert_eq!(
            TextEncoding::Utf8.decode("a.txt", b"hello".to_vec()).unwrap(),
            "hello"
        );

        let err = TextEncoding::Utf8
            .decode("bad.txt", vec![b'o', b'k', 0xC3, 0x28])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert_eq!(err.entry_name(), Some("bad.txt"));
        match err {
            ZipError::Encoding { source, .. } => assert_eq!(source.valid_up_to(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn latin1_text_never_fails() {
        let text = TextEncoding::Latin1.decode("x", vec![0x48, 0xE9, 0xFF]).unwrap();
        assert_eq!(text, "Héÿ");
    }
}
