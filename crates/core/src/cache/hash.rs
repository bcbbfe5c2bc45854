//! Request identity keys.

use sha2::{Digest, Sha256};

/// Compute the stable identity of a request inside a partition.
///
/// `url` must already be resolved and stripped of its fragment.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
