//! A [`Ledger`] shared between tasks.
//!
//! The chain and the pending pool sit behind one mutex. Mining snapshots the
//! pool and tip under the lock, runs the nonce search on the blocking pool with
//! the lock released, then re-locks to append. If another miner extended the
//! chain in the meantime the candidate is discarded and rebuilt on the new tip.

use crate::error::{ChainError, LedgerError, Result};
use crate::mine::search;
use crate::{Block, Ledger, Transaction};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub async fn add_transaction(&self, tx: Transaction) -> Result<()> {
        self.inner.lock().await.add_transaction(tx)?;
        Ok(())
    }

    /// Mine the pending pool into a new block and return a copy of it.
    ///
    /// Transactions admitted while the search runs stay pending for the next block.
    pub async fn mine_pending(&self, reward_address: &str) -> Result<Block> {
        loop {
            let (mut candidate, taken, config) = {
                let ledger = self.inner.lock().await;
                let (block, taken) = ledger.candidate_block(reward_address);
                (block, taken, ledger.config().clone())
            };

            let mined = tokio::task::spawn_blocking(move || {
                search(&mut candidate, &config);
                candidate
            })
            .await
            .map_err(|e| LedgerError::Worker(e.to_string()))?;

            let mut ledger = self.inner.lock().await;
            match ledger.commit_mined(mined, taken) {
                Ok(block) => return Ok(block.clone()),
                Err(stale) => warn!(
                    index = stale.header.index,
                    "chain tip moved while mining; retrying on the new tip"
                ),
            }
        }
    }

    pub async fn balance_of(&self, address: &str) -> Decimal {
        self.inner.lock().await.balance_of(address)
    }

    pub async fn validate(&self) -> std::result::Result<(), ChainError> {
        self.inner.lock().await.validate()
    }

    pub async fn is_valid(&self) -> bool {
        self.inner.lock().await.is_valid()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.lock().await.pending_transactions().len()
    }

    /// Copy of the chain as of now.
    pub async fn blocks(&self) -> Vec<Block> {
        self.inner.lock().await.blocks().to_vec()
    }

    /// Run a read-only closure against a consistent view of the ledger.
    pub async fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&*self.inner.lock().await)
    }
}
