//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// The key is the request's identity: method plus URL. Two requests with
/// the same method and URL always map to the same entry within a namespace.
pub fn entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let key1 = entry_key("GET", "https://example.com/");
        let key2 = entry_key("GET", "https://example.com/");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_different_url() {
        let key1 = entry_key("GET", "https://example.com/index.html");
        let key2 = entry_key("GET", "https://example.com/manifest.json");
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_key_different_method() {
        let get = entry_key("GET", "https://example.com/");
        let head = entry_key("HEAD", "https://example.com/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_key_format() {
        let key = entry_key("GET", "https://example.com/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
