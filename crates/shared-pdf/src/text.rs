//! Decoding of PDF text strings (ISO 32000-1 §7.9.2.2)

/// Decode a PDF text string into UTF-8.
///
/// Strings starting with a UTF-16BE byte order mark are decoded as UTF-16,
/// strings with a UTF-8 BOM as UTF-8, anything else as PDFDocEncoding
/// (approximated by Latin-1, which agrees on the printable range).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    bytes.iter().map(|&b| b as char).collect()
}
