use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// url-safe random text from `nbytes` random bytes (base64 without padding)
pub fn token_urlsafe(nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(&buf)
}

pub fn urlsafe_base64_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub fn urlsafe_base64_decode(s: &str) -> Option<Vec<u8>> {
    // tolerate padded input
    URL_SAFE_NO_PAD.decode(s.trim_end_matches('=')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_urlsafe_length() {
        // 4 chars per 3 bytes, no padding
        assert_eq!(token_urlsafe(75).len(), 100);
        assert_eq!(token_urlsafe(190).len(), 254);
        let t = token_urlsafe(32);
        assert!(t
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token_urlsafe(32), t);
    }

    #[test]
    fn test_base64_roundtrip_with_padding() {
        let encoded = urlsafe_base64_encode(b"42");
        assert_eq!(encoded, "NDI");
        assert_eq!(urlsafe_base64_decode("NDI=").unwrap(), b"42");
        assert!(urlsafe_base64_decode("!!").is_none());
    }
}
