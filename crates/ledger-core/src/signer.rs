//! Signing capability used to authorise transactions.
//!
//! The ledger core never verifies signatures itself; the [`Signed`](crate::policy::Signed)
//! admission policy and callers use [`verify`] when they want to.

use crate::hashing::{digest, HexDigest};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;

/// A holder of private key material that can prove authorship of messages.
pub trait Signer {
    /// Hex encoding of the public key.
    fn public_identity(&self) -> String;

    /// Hex encoding of a signature over `message`.
    fn sign(&self, message: &[u8]) -> String;

    /// The ledger address: digest of the public identity.
    fn address(&self) -> HexDigest {
        digest(self.public_identity())
    }
}

/// Check `signature` over `message` against a hex public identity.
/// Malformed identities or signatures simply fail verification.
pub fn verify(identity: &str, message: &[u8], signature: &str) -> bool {
    let Some(key) = decode_array::<32>(identity)
        .and_then(|bytes| VerifyingKey::from_bytes(&bytes).ok())
    else {
        return false;
    };
    let Some(sig) = decode_array::<64>(signature) else {
        return false;
    };
    key.verify(message, &Signature::from_bytes(&sig)).is_ok()
}

fn decode_array<const N: usize>(s: &str) -> Option<[u8; N]> {
    hex::decode(s).ok()?.try_into().ok()
}

/// Ed25519 key pair owned by a single holder. The secret key is zeroized on drop.
pub struct Wallet {
    key: SigningKey,
}

impl Wallet {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&secret),
        }
    }
}

impl Signer for Wallet {
    fn public_identity(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }

    fn sign(&self, message: &[u8]) -> String {
        hex::encode(self.key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wallet({})", self.address())
    }
}
