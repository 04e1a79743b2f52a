use crate::clock::{SystemClock, TimeSource};
use crate::config::LedgerConfig;
use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::{ChainError, ConfigError, TxRejected};
use crate::mine::search;
use crate::policy::AdmissionPolicy;
use crate::{Block, Transaction};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A zero-transaction genesis block pointing at the `"0"` sentinel. Never mined.
pub fn genesis_block(timestamp: u64) -> Block {
    Block::with_timestamp(0, vec![], GENESIS_PREVIOUS_HASH, timestamp)
}

/// In-memory chain plus the pool of transactions waiting for the next block.
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    config: LedgerConfig,
    genesis_address: String,
    policy: Box<dyn AdmissionPolicy>,
    clock: Arc<dyn TimeSource>,
}

impl Ledger {
    /// Ledger with default difficulty, reward and a permissive pool.
    pub fn new(genesis_address: impl Into<String>) -> Self {
        Self::build(genesis_address.into(), LedgerConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_config(
        genesis_address: impl Into<String>,
        config: LedgerConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(genesis_address, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        genesis_address: impl Into<String>,
        config: LedgerConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(genesis_address.into(), config, clock))
    }

    fn build(genesis_address: String, config: LedgerConfig, clock: Arc<dyn TimeSource>) -> Self {
        let policy = config.admission.policy();
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            config,
            genesis_address,
            policy,
            clock,
        };
        let genesis = ledger.create_genesis();
        ledger.chain.push(genesis);
        ledger
    }

    /// Replace the admission policy chosen by the config.
    pub fn with_policy(mut self, policy: impl AdmissionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn create_genesis(&self) -> Block {
        genesis_block(self.clock.epoch_seconds())
    }

    /// Queue a transaction for the next block if the admission policy allows it.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), TxRejected> {
        if let Err(reason) = self.policy.admit(&tx) {
            warn!(from = %tx.from, to = %tx.to, %reason, "transaction rejected");
            return Err(reason);
        }
        debug!(from = %tx.from, to = %tx.to, amount = %tx.amount, "transaction queued");
        self.pending.push(tx);
        Ok(())
    }

    /// Mine every pending transaction plus a reward for `reward_address` into a
    /// new block on the tip. The pool is empty afterwards.
    pub fn mine_pending_transactions(&mut self, reward_address: &str) -> &Block {
        let (mut block, taken) = self.candidate_block(reward_address);
        search(&mut block, &self.config);
        self.append(block, taken)
    }

    /// Candidate block over the current pool and tip, plus how many pending
    /// transactions it consumes. The pool itself is left untouched.
    pub(crate) fn candidate_block(&self, reward_address: &str) -> (Block, usize) {
        let taken = self.pending.len();
        let mut txs = self.pending.clone();
        txs.push(Transaction::reward(
            reward_address,
            self.config.mining_reward,
            self.clock.utc_iso8601(),
        ));
        let block = Block::with_timestamp(
            self.chain.len() as u64,
            txs,
            self.latest_block().hash.clone(),
            self.clock.epoch_seconds(),
        );
        (block, taken)
    }

    /// Append a block mined off-lock. Hands the block back if the tip moved
    /// since its candidate was built.
    pub(crate) fn commit_mined(&mut self, block: Block, taken: usize) -> Result<&Block, Block> {
        let tip = self.latest_block();
        if block.header.previous_hash != tip.hash || block.header.index != self.chain.len() as u64
        {
            return Err(block);
        }
        Ok(self.append(block, taken))
    }

    // The pool only grows between commits, so its first `taken` entries are
    // exactly the ones the block was built from.
    fn append(&mut self, block: Block, taken: usize) -> &Block {
        self.pending.drain(..taken.min(self.pending.len()));
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Net of every credit and debit touching `address`. May be negative.
    pub fn balance_of(&self, address: &str) -> Decimal {
        self.chain
            .iter()
            .flat_map(|block| block.txs.iter())
            .fold(Decimal::ZERO, |mut balance, tx| {
                if tx.from == address {
                    balance -= tx.amount;
                }
                if tx.to == address {
                    balance += tx.amount;
                }
                balance
            })
    }

    /// Check every block after genesis for a stale hash, transactions that no
    /// longer match the merkle root, or a broken link.
    pub fn validate(&self) -> Result<(), ChainError> {
        for (i, pair) in self.chain.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = i as u64 + 1;
            if !current.has_valid_hash() {
                warn!(index, "block hash does not match contents");
                return Err(ChainError::HashMismatch { index });
            }
            if !current.has_valid_merkle_root() {
                warn!(index, "merkle root does not match block transactions");
                return Err(ChainError::MerkleMismatch { index });
            }
            if current.header.previous_hash != previous.hash {
                warn!(index, "block does not link to its predecessor");
                return Err(ChainError::BrokenLink { index });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn latest_block(&self) -> &Block {
        // Genesis is pushed at construction and blocks are never removed.
        &self.chain[self.chain.len() - 1]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false once constructed; genesis is never removed. Pairs with `len`.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn mining_reward(&self) -> Decimal {
        self.config.mining_reward
    }

    pub fn genesis_address(&self) -> &str {
        &self.genesis_address
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("height", &self.chain.len())
            .field("pending", &self.pending.len())
            .field("config", &self.config)
            .field("genesis_address", &self.genesis_address)
            .finish()
    }
}
