use crate::{digest, pow::meets_difficulty, Block, LedgerConfig};
use rayon::prelude::*;
use tracing::{debug, info};

impl Block {
    /// Parallel form of [`Block::mine`]. Takes the lowest satisfying nonce at or
    /// above the current one, so the result is the same block the sequential
    /// search would produce.
    pub fn mine_parallel(&mut self, difficulty: u32) {
        let prefix = self.header.preimage_prefix();
        let start = self.header.nonce;

        // Rayon will split this range across threads.
        let found = (start..u64::MAX)
            .into_par_iter()
            .find_first(|nonce| meets_difficulty(&digest(format!("{prefix}{nonce}")), difficulty));

        match found {
            Some(nonce) => {
                self.header.nonce = nonce;
                self.hash = self.recompute_hash();
            }
            // Nothing left before u64::MAX; the sequential search wraps around.
            None => self.mine(difficulty),
        }
    }
}

/// Run the nonce search the way `config` asks for.
pub(crate) fn search(block: &mut Block, config: &LedgerConfig) {
    debug!(
        index = block.header.index,
        difficulty = config.difficulty,
        parallel = config.parallel_mining,
        "mining candidate block"
    );
    if config.parallel_mining {
        block.mine_parallel(config.difficulty);
    } else {
        block.mine(config.difficulty);
    }
    info!(
        "Mined block {} with nonce {} and hash {}",
        block.header.index, block.header.nonce, block.hash
    );
}
