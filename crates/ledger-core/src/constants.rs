pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const DEFAULT_DIFFICULTY: u32 = 2;
pub const DEFAULT_MINING_REWARD: i64 = 100;
pub const AMOUNT_SCALE: usize = 6;
