//! Base64 helpers shared by the image and file endpoints

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Drop a `data:<mime>;base64,` prefix if present
pub fn strip_data_uri(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, body)) => body,
        None => payload,
    }
}

/// Decode a base64 payload that may carry a data-URI prefix
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(strip_data_uri(payload).trim())
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_uri("QUJD"), "QUJD");
    }

    #[test]
    fn test_decode_with_and_without_prefix() {
        assert_eq!(decode_payload("data:text/plain;base64,QUJD").unwrap(), b"ABC");
        assert_eq!(decode_payload("QUJD\n").unwrap(), b"ABC");
        assert!(decode_payload("not base64!").is_err());
    }
}
