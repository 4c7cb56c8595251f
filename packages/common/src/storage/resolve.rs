use url::Url;

use super::bucket::Bucket;
use super::key::BlobKey;

/// Build the public URL of `key` in `bucket` under `base`.
pub fn public_url(base: &str, bucket: Bucket, key: &BlobKey) -> String {
    format!("{}/{bucket}/{key}", base.trim_end_matches('/'))
}

/// Map a stored public URL back to its key in `bucket`.
///
/// Finds the first path segment equal to the bucket name and takes every
/// segment after it. Returns `None` for malformed URLs, URLs that do not
/// contain the bucket segment, and remainders that are not valid keys. A
/// `None` means "nothing to delete", never a failure.
pub fn resolve_key(url: &str, bucket: Bucket) -> Option<BlobKey> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let start = segments.iter().position(|s| *s == bucket.as_str())?;

    let rest = &segments[start + 1..];
    if rest.is_empty() {
        return None;
    }

    BlobKey::parse(&rest.join("/")).ok()
}
