use thiserror::Error;

/// Structural inconsistency found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("block {index}: stored hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("block {index}: merkle root does not match its transactions")]
    MerkleMismatch { index: u64 },

    #[error("block {index}: previous hash does not match the preceding block")]
    BrokenLink { index: u64 },
}

impl ChainError {
    /// Index of the first inconsistent block.
    pub fn index(&self) -> u64 {
        match self {
            ChainError::HashMismatch { index }
            | ChainError::MerkleMismatch { index }
            | ChainError::BrokenLink { index } => *index,
        }
    }
}

/// Reasons an admission policy refuses a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxRejected {
    #[error("sender is empty")]
    EmptySender,

    #[error("receiver is empty")]
    EmptyReceiver,

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("transaction is not signed")]
    MissingSignature,

    #[error("signature does not verify")]
    BadSignature,

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("difficulty {difficulty} exceeds the {max} hex characters of a digest")]
    DifficultyTooHigh { difficulty: u32, max: usize },

    #[error("mining reward must be positive")]
    NonPositiveReward,

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction rejected: {0}")]
    Rejected(#[from] TxRejected),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("mining worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
