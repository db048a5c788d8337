use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use log::{debug, info, warn};

use crate::blockchain::Block;
use crate::blockchain::hash::{digest, meets_difficulty};
use crate::error::{ChainError, MineError};
use crate::node::lock;
use crate::transaction::{Transaction, TransactionPool};

/// How many nonces are tried between two looks at the stop condition.
const STOP_CHECK_INTERVAL: u64 = 1 << 12;

/// Tip epoch shared by every mining attempt on a node.
///
/// Each tip change (or explicit cancel) bumps the epoch; an attempt holding a
/// ticket from an older epoch abandons its search.
#[derive(Debug, Default)]
pub struct MiningSignal {
    epoch: AtomicU64,
}

impl MiningSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> MiningTicket<'_> {
        MiningTicket {
            signal: self,
            epoch: self.epoch.load(Ordering::SeqCst),
        }
    }

    /// Invalidate all outstanding tickets.
    pub fn interrupt(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MiningTicket<'a> {
    signal: &'a MiningSignal,
    epoch: u64,
}

impl MiningTicket<'_> {
    pub fn is_stale(&self) -> bool {
        self.signal.epoch.load(Ordering::SeqCst) != self.epoch
    }
}

/// Proof-of-Work search for a fixed `(index, previous_hash, timestamp,
/// transactions)` tuple, trying nonces from 0 upwards. Returns `None` when
/// `should_stop` fires before a nonce is found.
pub fn search(
    index: u64,
    previous_hash: &str,
    timestamp: i64,
    transactions: Vec<Transaction>,
    difficulty: u32,
    should_stop: impl Fn() -> bool,
) -> Option<Block> {
    let mut nonce: u64 = 0;
    loop {
        if nonce % STOP_CHECK_INTERVAL == 0 && should_stop() {
            return None;
        }
        let hash = digest(index, previous_hash, timestamp, &transactions, nonce);
        if meets_difficulty(&hash, difficulty) {
            return Some(Block {
                index,
                previous_hash: previous_hash.to_string(),
                timestamp,
                transactions,
                nonce,
                hash,
            });
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Turns the pending pool into sealed blocks.
#[derive(Debug, Clone)]
pub struct Miner {
    difficulty: u32,
    reward: u64,
}

impl Miner {
    pub fn new(difficulty: u32, reward: u64) -> Self {
        Self { difficulty, reward }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Mine one block on top of `parent`.
    ///
    /// The pool lock is held only to drain it and, afterwards, to queue the
    /// reward or hand the batch back. `commit` runs once a nonce is found
    /// (normally appending to the chain); the reward for `reward_recipient` is
    /// queued only if it succeeds. A cancelled or rejected attempt restores
    /// the drained transactions to the front of the pool.
    pub fn mine<F>(
        &self,
        pool: &Mutex<TransactionPool>,
        parent: &Block,
        reward_recipient: &str,
        ticket: MiningTicket<'_>,
        commit: F,
    ) -> Result<Block, MineError>
    where
        F: FnOnce(&Block) -> Result<(), ChainError>,
    {
        let transactions = lock(pool).drain_all();
        if transactions.is_empty() {
            return Err(MineError::NothingToMine);
        }

        let timestamp = Utc::now().timestamp();
        let index = parent.index + 1;
        debug!(
            "MINER - searching block #{} over {} txs (difficulty={})",
            index,
            transactions.len(),
            self.difficulty
        );

        let Some(block) = search(
            index,
            &parent.hash,
            timestamp,
            transactions.clone(),
            self.difficulty,
            || ticket.is_stale(),
        ) else {
            warn!("MINER - search for block #{} cancelled", index);
            lock(pool).restore(transactions);
            return Err(MineError::Cancelled);
        };

        if let Err(e) = commit(&block) {
            warn!("MINER - block #{} rejected on commit: {}", index, e);
            lock(pool).restore(transactions);
            return Err(MineError::Stale(e));
        }

        lock(pool).enqueue(Transaction::reward(reward_recipient, self.reward));
        info!(
            "MINER - sealed block #{} (hash={}, nonce={})",
            block.index, block.hash, block.nonce
        );
        Ok(block)
    }
}
