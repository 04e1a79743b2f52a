//! SHA-256 digests rendered as lower-case hex text.

use sha2::{Digest, Sha256};

/// 64-character lower-case hex SHA-256 digest.
pub type HexDigest = String;

/// Hash arbitrary bytes (empty input included) into a hex digest.
pub fn digest(bytes: impl AsRef<[u8]>) -> HexDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    hex::encode(hasher.finalize())
}
