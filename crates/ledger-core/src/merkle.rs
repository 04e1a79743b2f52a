//! Pairwise Merkle reduction over hex leaf digests.

use crate::hashing::{digest, HexDigest};

/// Reduce ordered leaf digests to a single root.
///
/// Each level is hashed left-to-right in pairs as `hash(left ‖ right)` over the
/// hex text; an odd tail is paired with itself. No leaves yields the empty
/// string and a single leaf is its own root.
pub fn merkle_root<S: AsRef<str>>(leaves: &[S]) -> HexDigest {
    if leaves.is_empty() {
        return String::new();
    }
    let mut level: Vec<HexDigest> = leaves.iter().map(|l| l.as_ref().to_owned()).collect();

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let (a, b) = if pair.len() == 2 {
                (&pair[0], &pair[1])
            } else {
                (&pair[0], &pair[0])
            };
            let mut combined = String::with_capacity(a.len() + b.len());
            combined.push_str(a);
            combined.push_str(b);
            next.push(digest(combined));
        }
        level = next;
    }
    level.swap_remove(0)
}
