// Text decoding for comment strings read out of Vorbis headers

use std::borrow::Cow;

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Text encoding a comment string was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// Legacy taggers wrote Latin-1 despite the format mandating UTF-8
    Windows1252,
}

/// Decode comment bytes as UTF-8, falling back to Windows-1252
pub fn decode_text(data: &[u8]) -> (Cow<'_, str>, TextEncoding) {
    match UTF_8.decode_without_bom_handling_and_without_replacement(data) {
        Some(text) => (text, TextEncoding::Utf8),
        None => (
            WINDOWS_1252.decode_without_bom_handling(data).0,
            TextEncoding::Windows1252,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_kept() {
        let (text, encoding) = decode_text("ARTIST=Björk".as_bytes());
        assert_eq!(text, "ARTIST=Björk");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn latin1_bytes_fall_back() {
        let (text, encoding) = decode_text(b"ARTIST=Bj\xf6rk");
        assert_eq!(text, "ARTIST=Björk");
        assert_eq!(encoding, TextEncoding::Windows1252);
    }
}
