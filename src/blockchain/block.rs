use serde::{Deserialize, Serialize};

use super::GENESIS_PREVIOUS_HASH;
use super::hash::{digest, meets_difficulty};
use crate::transaction::Transaction;

/// A sealed block. Field order matches the wire record exchanged with peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: i64, // Unix timestamp (UTC), recorded only
    pub transactions: Vec<Transaction>,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // Digest of the five fields above
}

impl Block {
    /// The fixed first block. Every node derives the same one, so chains
    /// built independently can still be compared and exchanged.
    pub fn genesis() -> Self {
        Self::seal(0, GENESIS_PREVIOUS_HASH.to_string(), 0, Vec::new(), 0)
    }

    /// Build a block and compute its hash from the given fields.
    pub fn seal(
        index: u64,
        previous_hash: String,
        timestamp: i64,
        transactions: Vec<Transaction>,
        nonce: u64,
    ) -> Self {
        let hash = digest(index, &previous_hash, timestamp, &transactions, nonce);
        Self {
            index,
            previous_hash,
            timestamp,
            transactions,
            nonce,
            hash,
        }
    }

    /// Recompute the digest from the block's content fields
    /// (excluding the `hash` field itself).
    pub fn compute_hash(&self) -> String {
        digest(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
            self.nonce,
        )
    }

    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Validate that the stored `hash` matches the content and satisfies the
    /// PoW difficulty. (Does NOT validate chain linkage.)
    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.has_valid_hash() && meets_difficulty(&self.hash, difficulty)
    }

    pub fn is_genesis(&self) -> bool {
        *self == Self::genesis()
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::Transaction;

    #[test]
    fn genesis_is_fixed() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a, b);
        assert_eq!(a.index, 0);
        assert_eq!(a.previous_hash, "0");
        assert!(a.transactions.is_empty());
        assert_eq!(a.hash, a.compute_hash());
    }

    #[test]
    fn invalid_when_mutated() {
        let mut b = Block::seal(
            2,
            "prev".into(),
            1_700_000_000,
            vec![Transaction::new("Alice", "Bob", 10)],
            0,
        );
        assert!(b.has_valid_hash());

        b.transactions.push(Transaction::new("Mallory", "Mallory", 1_000));
        assert!(!b.has_valid_hash());
        assert!(!b.is_valid(0));
    }

    #[test]
    fn wire_record_has_the_six_fields() {
        let b = Block::seal(1, "p".into(), 9, vec![Transaction::new("a", "b", 3)], 4);
        let value = serde_json::to_value(&b).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        for key in ["index", "previous_hash", "timestamp", "transactions", "nonce", "hash"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(
            value["transactions"][0],
            serde_json::json!({ "sender": "a", "recipient": "b", "amount": 3 })
        );
        let back: Block = serde_json::from_value(value).unwrap();
        assert_eq!(back, b);
    }
}
