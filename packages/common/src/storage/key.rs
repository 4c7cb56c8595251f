use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bucket::Bucket;
use super::error::StorageError;

const MAX_KEY_LEN: usize = 512;
const MAX_EXT_LEN: usize = 8;

/// A validated, path-like blob identifier within a bucket.
///
/// Generated keys have the shape `{bucket}/{prefix}_{unix_millis}_{8 hex}.{ext}`.
/// The random suffix keeps two uploads landing in the same millisecond from
/// colliding, since nothing coordinates writers to a shared bucket.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobKey(String);

impl BlobKey {
    /// Generate a fresh key for an upload into `bucket`.
    pub fn generate(bucket: Bucket, prefix: &str, original_name: &str) -> Self {
        let prefix = sanitize_prefix(prefix);
        let ext = extension_of(original_name);
        let millis = Utc::now().timestamp_millis();
        let suffix: [u8; 4] = rand::rng().random();
        Self(format!(
            "{bucket}/{prefix}_{millis}_{}.{ext}",
            hex::encode(suffix)
        ))
    }

    /// Parse and validate an existing key.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty() {
            return Err(StorageError::InvalidKey("key is empty".into()));
        }
        if s.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key exceeds {MAX_KEY_LEN} bytes"
            )));
        }
        if s.chars().any(|c| c.is_control()) {
            return Err(StorageError::InvalidKey(
                "key contains control characters".into(),
            ));
        }
        if s.contains('\\') {
            return Err(StorageError::InvalidKey("key contains backslashes".into()));
        }
        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidKey(
                    "key contains empty segments".into(),
                ));
            }
            if segment == "." || segment == ".." {
                return Err(StorageError::InvalidKey(
                    "key contains relative segments".into(),
                ));
            }
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "asset".into()
    } else {
        cleaned.to_string()
    }
}

fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()))
        .filter(|(stem, ext)| {
            !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXT_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|(_, ext)| ext)
        .unwrap_or_else(|| "bin".into())
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({})", self.0)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BlobKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlobKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_has_expected_shape() {
        let key = BlobKey::generate(Bucket::Products, "product", "Photo.JPG");
        let segments: Vec<_> = key.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "products");

        let name = segments[1];
        assert!(name.starts_with("product_"));
        assert!(name.ends_with(".jpg"));

        let stem = name.trim_end_matches(".jpg");
        let parts: Vec<_> = stem.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_differs_within_same_millisecond() {
        let keys: std::collections::HashSet<_> = (0..64)
            .map(|_| BlobKey::generate(Bucket::Gallery, "gallery", "a.png"))
            .collect();
        assert_eq!(keys.len(), 64);
    }

    #[test]
    fn generate_sanitizes_prefix() {
        let key = BlobKey::generate(Bucket::Logos, " Footer Logo! ", "x.png");
        assert!(key.as_str().starts_with("logos/footer-logo_"));

        let key = BlobKey::generate(Bucket::Logos, "???", "x.png");
        assert!(key.as_str().starts_with("logos/asset_"));
    }

    #[test]
    fn generate_falls_back_for_odd_extensions() {
        for name in ["noext", ".hidden", "weird.p!g", "long.abcdefghijk", "trailing."] {
            let key = BlobKey::generate(Bucket::Contacts, "qr", name);
            assert!(key.as_str().ends_with(".bin"), "{name} -> {key}");
        }
    }

    #[test]
    fn generated_keys_parse() {
        let key = BlobKey::generate(Bucket::Promotions, "promo", "banner.webp");
        assert_eq!(BlobKey::parse(key.as_str()).unwrap(), key);
    }

    #[test]
    fn parse_rejects_bad_keys() {
        for bad in [
            "",
            "/leading",
            "trailing/",
            "a//b",
            "a/../b",
            "./a",
            "a\\b",
            "a\0b",
            "a\nb",
        ] {
            assert!(BlobKey::parse(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(BlobKey::parse(&"a".repeat(MAX_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let key: BlobKey = serde_json::from_str("\"gallery/a.png\"").unwrap();
        assert_eq!(key.as_str(), "gallery/a.png");
        assert!(serde_json::from_str::<BlobKey>("\"../etc\"").is_err());
    }
}
