use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::Serialize;

use crate::blockchain::{Block, Blockchain, MINING_REWARD};
use crate::error::{ChainError, MineError};
use crate::mining::{Miner, MiningSignal, MiningTicket};
use crate::network::PeerDirectory;
use crate::transaction::{Transaction, TransactionPool};

/// Lock a mutex, recovering the data if a previous holder panicked.
/// None of the guarded structures can be left half-updated by a panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where a submitted transaction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Zero-based position in the pending pool.
    pub position: usize,
    /// Index of the block expected to include it.
    pub block_index: u64,
}

/// Result of a block pushed to us by a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReceipt {
    Accepted,
    /// Already part of the chain at the same index.
    Duplicate,
    /// Well-formed but does not attach to our tip; we are missing blocks
    /// or sit on a different fork.
    Orphan,
    Rejected(ChainError),
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
    pub height: usize,
    pub difficulty: u32,
    pub tip_hash: String,
    pub pending_transactions: usize,
    pub peers: usize,
}

/// All state of one ledger node: chain, pending pool and peer directory,
/// each behind its own lock.
#[derive(Debug)]
pub struct Node {
    chain: Mutex<Blockchain>,
    pool: Mutex<TransactionPool>,
    peers: Mutex<PeerDirectory>,
    miner: Miner,
    signal: MiningSignal,
}

impl Node {
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: Mutex::new(Blockchain::new(difficulty)),
            pool: Mutex::new(TransactionPool::new()),
            peers: Mutex::new(PeerDirectory::new()),
            miner: Miner::new(difficulty, MINING_REWARD),
            signal: MiningSignal::new(),
        }
    }

    pub fn submit_transaction(&self, sender: &str, recipient: &str, amount: u64) -> Submission {
        let block_index = self.tip_index() + 1;
        let position = lock(&self.pool).enqueue(Transaction::new(sender, recipient, amount));
        debug!("queued tx {sender} -> {recipient} ({amount}) at position {position}");
        Submission {
            position,
            block_index,
        }
    }

    /// Mine the whole pending pool into a block on the current tip.
    ///
    /// Runs the PoW search without holding any lock, so callers should run
    /// it off the request path. The search is abandoned as soon as the tip
    /// changes or `cancel_mining` is called.
    pub fn mine_next(&self, miner_address: &str) -> Result<Block, MineError> {
        let (ticket, parent) = self.mining_snapshot()?;

        self.miner
            .mine(&self.pool, &parent, miner_address, ticket, |block| {
                let mut chain = lock(&self.chain);
                chain.append(block.clone())?;
                self.signal.interrupt();
                Ok(())
            })
    }

    /// Parent for the next block plus a ticket from the same tip epoch.
    /// Every tip change bumps the epoch while still holding the chain lock,
    /// so both are read under it.
    fn mining_snapshot(&self) -> Result<(MiningTicket<'_>, Block), ChainError> {
        let chain = lock(&self.chain);
        let parent = chain.tip()?.clone();
        Ok((self.signal.ticket(), parent))
    }

    /// Abandon any in-flight mining attempt.
    pub fn cancel_mining(&self) {
        info!("mining cancel requested");
        self.signal.interrupt();
    }

    /// Read-only copy of the chain.
    pub fn get_chain(&self) -> Vec<Block> {
        lock(&self.chain).blocks().to_vec()
    }

    pub fn register_peer(&self, address: &str) -> bool {
        let added = lock(&self.peers).register(address);
        if added {
            info!("registered peer {}", address.trim());
        }
        added
    }

    pub fn peers(&self) -> Vec<String> {
        lock(&self.peers).snapshot()
    }

    pub fn has_peers(&self) -> bool {
        !lock(&self.peers).is_empty()
    }

    /// Try to attach a block pushed by a peer.
    pub fn receive_block(&self, block: Block) -> BlockReceipt {
        let mut chain = lock(&self.chain);

        if chain.get(block.index).is_some_and(|known| *known == block) {
            debug!("block #{} already known", block.index);
            return BlockReceipt::Duplicate;
        }
        if !block.is_valid(chain.difficulty()) {
            let err = ChainError::InvalidBlock(format!(
                "block #{} fails hash or difficulty check",
                block.index
            ));
            warn!("rejecting pushed block: {err}");
            return BlockReceipt::Rejected(err);
        }

        let tip = match chain.tip() {
            Ok(tip) => tip,
            Err(e) => return BlockReceipt::Rejected(e),
        };
        let next_index = tip.index + 1;
        if block.index > next_index
            || (block.index == next_index && block.previous_hash != tip.hash)
        {
            debug!(
                "block #{} does not attach to tip #{}, needs sync",
                block.index, tip.index
            );
            return BlockReceipt::Orphan;
        }

        match chain.append(block) {
            Ok(()) => {
                self.signal.interrupt();
                BlockReceipt::Accepted
            }
            Err(e) => {
                warn!("rejecting pushed block: {e}");
                BlockReceipt::Rejected(e)
            }
        }
    }

    /// Swap in a candidate chain if it beats the local one.
    pub fn adopt_chain(&self, candidate: Vec<Block>) -> bool {
        let mut chain = lock(&self.chain);
        let replaced = chain.replace(candidate);
        if replaced {
            self.signal.interrupt();
        }
        replaced
    }

    pub fn validate(&self) -> bool {
        lock(&self.chain).validate_self()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        lock(&self.pool).snapshot()
    }

    pub fn has_pending(&self) -> bool {
        !lock(&self.pool).is_empty()
    }

    pub fn chain_len(&self) -> usize {
        lock(&self.chain).len()
    }

    pub fn difficulty(&self) -> u32 {
        self.miner.difficulty()
    }

    pub fn stats(&self) -> NodeStats {
        let (height, tip_hash) = {
            let chain = lock(&self.chain);
            let tip_hash = chain.tip().map(|b| b.hash.clone()).unwrap_or_default();
            (chain.len(), tip_hash)
        };
        NodeStats {
            height,
            difficulty: self.difficulty(),
            tip_hash,
            pending_transactions: lock(&self.pool).len(),
            peers: lock(&self.peers).len(),
        }
    }

    fn tip_index(&self) -> u64 {
        lock(&self.chain).tip().map(|b| b.index).unwrap_or_default()
    }
}
