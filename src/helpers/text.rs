//! Text decoding helpers for uploaded delimited files

use crate::error::DashboardError;
use encoding_rs::UTF_8;
use std::borrow::Cow;

/// Decodes strict UTF-8, dropping a leading byte order mark.
/// Malformed sequences are a parse failure instead of being replaced.
pub(crate) fn decode_utf8(bytes: &[u8]) -> Result<Cow<'_, str>, DashboardError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| DashboardError::ParseError("input is not valid UTF-8".to_owned()))
}

/// Encodes text for the standard PDF fonts (WinAnsiEncoding).
/// Characters outside Windows-1252 become numeric references, which keeps titles readable.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn strips_byte_order_mark() {
        let text = decode_utf8(b"\xEF\xBB\xBFData;Vendas").unwrap();
        assert_eq!(text, "Data;Vendas");
    }

    #[test]
    fn rejects_malformed_utf8() {
        let error = decode_utf8(b"Data\xFF\xFE").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn encodes_latin_titles() {
        assert_eq!(encode_win_ansi("Conteúdo"), b"Conte\xFAdo".to_vec());
    }
}
