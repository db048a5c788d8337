use log::{debug, info, warn};

use super::Block;
use crate::error::ChainError;

/// Simple in-memory blockchain with Proof-of-Work.
///
/// The block sequence is only ever changed by `append` or a whole-sequence
/// `replace`, so holders of the owning lock always see a complete chain.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
}

impl Blockchain {
    /// Initialize a new blockchain with the genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            difficulty,
        }
    }

    /// Return the last block in the chain.
    pub fn tip(&self) -> Result<&Block, ChainError> {
        self.chain.last().ok_or(ChainError::EmptyChain)
    }

    /// Append a block that extends the tip. On any failed check the chain is
    /// left untouched.
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.tip()?;
        Self::check_link(tip, &block, self.difficulty)?;
        debug!("appending block #{} ({})", block.index, block.hash);
        self.chain.push(block);
        Ok(())
    }

    /// Validate the whole local chain: genesis, linkage, hashes and PoW.
    pub fn validate_self(&self) -> bool {
        Self::validate_chain(&self.chain, self.difficulty)
    }

    /// Validate an arbitrary block sequence (e.g. a peer's chain) under the
    /// given difficulty.
    pub fn validate_chain(blocks: &[Block], difficulty: u32) -> bool {
        let Some(genesis) = blocks.first() else {
            return false;
        };
        if !genesis.is_genesis() {
            return false;
        }

        blocks
            .windows(2)
            .all(|pair| Self::check_link(&pair[0], &pair[1], difficulty).is_ok())
    }

    /// Adopt `candidate` iff it is strictly longer than the local chain and
    /// valid under the local difficulty. Returns whether it was adopted.
    pub fn replace(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() {
            debug!(
                "candidate chain not longer ({} <= {}), keeping local",
                candidate.len(),
                self.chain.len()
            );
            return false;
        }
        if !Self::validate_chain(&candidate, self.difficulty) {
            warn!("rejecting invalid candidate chain of length {}", candidate.len());
            return false;
        }

        info!(
            "replacing local chain ({} blocks) with candidate ({} blocks)",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate;
        true
    }

    /// Block at `index`, if the chain is that long.
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn check_link(parent: &Block, block: &Block, difficulty: u32) -> Result<(), ChainError> {
        if block.index != parent.index + 1 {
            return Err(ChainError::InvalidBlock(format!(
                "expected index {}, got {}",
                parent.index + 1,
                block.index
            )));
        }
        if block.previous_hash != parent.hash {
            return Err(ChainError::InvalidBlock(format!(
                "block #{} does not link to {}",
                block.index, parent.hash
            )));
        }
        if !block.has_valid_hash() {
            return Err(ChainError::InvalidBlock(format!(
                "block #{} hash does not match its contents",
                block.index
            )));
        }
        if !block.is_valid(difficulty) {
            return Err(ChainError::InvalidBlock(format!(
                "block #{} does not meet difficulty {}",
                block.index, difficulty
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::search;
    use crate::transaction::Transaction;

    const DIFF: u32 = 1;

    fn next_block(parent: &Block, txs: Vec<Transaction>) -> Block {
        search(
            parent.index + 1,
            &parent.hash,
            1_700_000_000 + parent.index as i64,
            txs,
            DIFF,
            || false,
        )
        .expect("uncancelled search always finds a nonce")
    }

    fn chain_of(len: usize) -> Blockchain {
        let mut bc = Blockchain::new(DIFF);
        for i in 1..len {
            let parent = bc.tip().unwrap().clone();
            let tx = Transaction::new("Alice", "Bob", i as u64);
            bc.append(next_block(&parent, vec![tx])).unwrap();
        }
        bc
    }

    #[test]
    fn starts_with_genesis_only() {
        let bc = Blockchain::new(DIFF);
        assert_eq!(bc.len(), 1);
        assert!(bc.tip().unwrap().is_genesis());
        assert!(bc.validate_self());
    }

    #[test]
    fn valid_chain_validates() {
        let bc = chain_of(4);
        assert_eq!(bc.len(), 4);
        assert!(bc.validate_self());
    }

    #[test]
    fn tampering_any_field_breaks_validation() {
        let bc = chain_of(3);
        let tamperings: [fn(&mut Block); 5] = [
            |b: &mut Block| b.index += 1,
            |b: &mut Block| b.previous_hash = "f".repeat(64),
            |b: &mut Block| b.timestamp += 1,
            |b: &mut Block| b.transactions[0].amount += 1,
            |b: &mut Block| b.nonce += 1,
        ];

        for tamper in tamperings {
            let mut blocks = bc.blocks().to_vec();
            tamper(&mut blocks[1]);
            assert!(!Blockchain::validate_chain(&blocks, DIFF));
        }
    }

    #[test]
    fn validation_rechecks_proof_of_work() {
        let bc = Blockchain::new(DIFF);
        let genesis = bc.tip().unwrap().clone();
        // Correctly hashed and linked, but not searched for a nonce.
        let mut nonce = 0;
        let weak = loop {
            let b = Block::seal(1, genesis.hash.clone(), 0, vec![], nonce);
            if !b.hash.starts_with('0') {
                break b;
            }
            nonce += 1;
        };
        assert!(!Blockchain::validate_chain(&[genesis, weak], DIFF));
    }

    #[test]
    fn foreign_genesis_is_invalid() {
        let mut blocks = chain_of(2).blocks().to_vec();
        blocks[0] = Block::seal(0, "0".into(), 12345, vec![], 0);
        assert!(!Blockchain::validate_chain(&blocks, DIFF));
        assert!(!Blockchain::validate_chain(&[], DIFF));
    }

    #[test]
    fn append_rejects_wrong_index() {
        let mut bc = chain_of(2);
        let tip = bc.tip().unwrap().clone();
        let mut block = next_block(&tip, vec![]);
        block.index += 1;
        block.hash = block.compute_hash();

        let err = bc.append(block).unwrap_err();
        assert!(matches!(err, ChainError::InvalidBlock(_)));
        assert_eq!(bc.len(), 2);
    }

    #[test]
    fn append_rejects_wrong_parent() {
        let mut bc = chain_of(2);
        let genesis = bc.blocks()[0].clone();
        let mut block = next_block(&genesis, vec![]);
        block.index = 2;
        block.hash = block.compute_hash();

        assert!(bc.append(block).is_err());
        assert_eq!(bc.len(), 2);
    }

    #[test]
    fn append_rejects_stale_hash() {
        let mut bc = chain_of(1);
        let tip = bc.tip().unwrap().clone();
        let mut block = next_block(&tip, vec![Transaction::new("a", "b", 1)]);
        block.transactions[0].amount = 2;

        assert!(bc.append(block).is_err());
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn replace_requires_strictly_longer() {
        let mut local = chain_of(3);
        let same_len = chain_of(3).blocks().to_vec();
        assert!(!local.replace(same_len));

        let longer = chain_of(4).blocks().to_vec();
        assert!(local.replace(longer.clone()));
        assert_eq!(local.blocks(), longer.as_slice());
    }

    #[test]
    fn replace_rejects_invalid_longer_chain() {
        let mut local = chain_of(2);
        let mut longer = chain_of(4).blocks().to_vec();
        longer[2].nonce += 1;

        assert!(!local.replace(longer));
        assert_eq!(local.len(), 2);
    }
}
