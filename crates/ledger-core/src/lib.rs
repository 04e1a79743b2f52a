use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod chain;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod hashing;
pub mod merkle;
pub mod mine;
pub mod policy;
pub mod shared;
pub mod signer;

pub use chain::Ledger;
pub use clock::{FixedClock, SystemClock, TimeSource};
pub use config::{AdmissionMode, LedgerConfig};
pub use error::{ChainError, ConfigError, LedgerError, TxRejected};
pub use hashing::{digest, HexDigest};
pub use merkle::merkle_root;
pub use policy::AdmissionPolicy;
pub use shared::SharedLedger;
pub use signer::{Signer, Wallet};

use constants::AMOUNT_SCALE;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// Empty for mining rewards.
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    /// ISO-8601 UTC, e.g. `2025-07-25T23:59:59Z`.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

// Identity is the hashed content; the signature is an attachment.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.amount == other.amount
            && self.from == other.from
            && self.to == other.to
    }
}

impl Transaction {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: Decimal,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp: timestamp.into(),
            signature: None,
        }
    }

    /// A transaction stamped with the current UTC time.
    pub fn now(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self::new(from, to, amount, SystemClock.utc_iso8601())
    }

    /// A system-issued credit with no sender.
    pub fn reward(to: impl Into<String>, amount: Decimal, timestamp: impl Into<String>) -> Self {
        Self::new("", to, amount, timestamp)
    }

    pub fn is_reward(&self) -> bool {
        self.from.is_empty()
    }

    /// Sender, receiver, amount and timestamp with no separators. The amount
    /// carries at least six decimals and every significant digit beyond that.
    pub fn canonical_string(&self) -> String {
        let scale = (self.amount.normalize().scale() as usize).max(AMOUNT_SCALE);
        format!(
            "{}{}{:.*}{}",
            self.from, self.to, scale, self.amount, self.timestamp
        )
    }

    pub fn hash(&self) -> HexDigest {
        digest(self.canonical_string())
    }

    /// Basic shape check: both parties present and a positive amount.
    pub fn check(&self) -> Result<(), TxRejected> {
        if self.from.is_empty() {
            return Err(TxRejected::EmptySender);
        }
        if self.to.is_empty() {
            return Err(TxRejected::EmptyReceiver);
        }
        if self.amount <= Decimal::ZERO {
            return Err(TxRejected::NonPositiveAmount);
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.check().is_ok()
    }

    /// Attach `signer`'s signature over the canonical string.
    pub fn signed_by(mut self, signer: &dyn Signer) -> Self {
        self.signature = Some(signer.sign(self.canonical_string().as_bytes()));
        self
    }

    pub fn verify_signature(&self, identity: &str) -> bool {
        match &self.signature {
            Some(sig) => signer::verify(identity, self.canonical_string().as_bytes(), sig),
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_hash: HexDigest,
    pub merkle_root: HexDigest,
    /// Epoch seconds, fixed before mining starts.
    pub timestamp: u64,
    pub nonce: u64,
}

impl BlockHeader {
    pub fn new(index: u64, previous_hash: HexDigest, merkle_root: HexDigest, timestamp: u64) -> Self {
        Self {
            index,
            previous_hash,
            merkle_root,
            timestamp,
            nonce: 0,
        }
    }

    /// Every hashed field except the nonce, which is appended last.
    pub(crate) fn preimage_prefix(&self) -> String {
        format!(
            "{}{}{}{}",
            self.index, self.timestamp, self.previous_hash, self.merkle_root
        )
    }

    pub fn hash_preimage(&self) -> String {
        format!("{}{}", self.preimage_prefix(), self.nonce)
    }

    pub fn hash(&self) -> HexDigest {
        digest(self.hash_preimage())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<Transaction>,
    /// Stored digest; equals `header.hash()` for any untampered block.
    pub hash: HexDigest,
}

impl Block {
    /// Build a block stamped with the current time. Nonce starts at 0.
    pub fn new(index: u64, txs: Vec<Transaction>, previous_hash: impl Into<HexDigest>) -> Self {
        Self::with_timestamp(index, txs, previous_hash, SystemClock.epoch_seconds())
    }

    pub fn with_timestamp(
        index: u64,
        txs: Vec<Transaction>,
        previous_hash: impl Into<HexDigest>,
        timestamp: u64,
    ) -> Self {
        let mut block = Self {
            header: BlockHeader::new(index, previous_hash.into(), String::new(), timestamp),
            txs,
            hash: String::new(),
        };
        block.header.merkle_root = block.recompute_merkle_root();
        block.hash = block.recompute_hash();
        block
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    /// Digest of the current header fields. Pure; never touches `self.hash`.
    pub fn recompute_hash(&self) -> HexDigest {
        self.header.hash()
    }

    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.recompute_hash()
    }

    /// Merkle root over the transactions as they are stored now.
    pub fn recompute_merkle_root(&self) -> HexDigest {
        let leaves: Vec<HexDigest> = self.txs.iter().map(Transaction::hash).collect();
        merkle_root(&leaves)
    }

    pub fn has_valid_merkle_root(&self) -> bool {
        self.header.merkle_root == self.recompute_merkle_root()
    }

    /// Advance the nonce until the hash has `difficulty` leading `'0'` digits.
    /// Difficulty 0 returns immediately.
    pub fn mine(&mut self, difficulty: u32) {
        while !pow::meets_difficulty(&self.hash, difficulty) {
            self.header.nonce = self.header.nonce.wrapping_add(1);
            self.hash = self.recompute_hash();
        }
    }
}

pub mod pow {
    /// Number of leading `'0'` characters in a hex digest.
    pub fn leading_zero_digits(hash: &str) -> usize {
        hash.bytes().take_while(|b| *b == b'0').count()
    }

    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let d = difficulty as usize;
        hash.len() >= d && hash.as_bytes()[..d].iter().all(|b| *b == b'0')
    }
}
