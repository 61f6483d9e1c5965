//! Content digests for cache-busted asset paths.

use std::sync::LazyLock;

use regex::Regex;
use sha1::{Digest, Sha1};

/// Number of hex characters of the SHA-1 digest embedded in file names.
pub const DIGEST_LEN: usize = 10;

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.[A-Za-z0-9_]+)$").expect("invalid extension regex"));

/// Short hex digest of `content`: the first [`DIGEST_LEN`] characters of its SHA-1.
#[must_use]
pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content);
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(DIGEST_LEN);
    digest
}

/// Insert `-{digest}` before the file extension of `path`.
///
/// `img/logo.png` + `0123456789` → `img/logo-0123456789.png`.
/// Paths without an extension are returned unchanged.
#[must_use]
pub fn digest_path(path: &str, digest: &str) -> String {
    EXTENSION
        .replace(path, |caps: &regex::Captures<'_>| format!("-{digest}{}", &caps[1]))
        .into_owned()
}
