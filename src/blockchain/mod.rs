pub mod block;
pub mod hash;
pub mod model;

pub use block::Block;
pub use model::Blockchain;

/// Default Proof-of-Work difficulty (number of leading zero hex characters).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Upper bound accepted from configuration (keep low to avoid long waits).
pub const MAX_DIFFICULTY: u32 = 6;

/// Amount paid to the miner of a block, queued for the next round.
pub const MINING_REWARD: u64 = 50;

/// Sender used for reward transactions.
pub const REWARD_SENDER: &str = "System";

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
