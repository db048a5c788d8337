use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// SHA-256 over the canonical encoding of a block's content fields.
///
/// The preimage is `index:previous_hash:timestamp:transactions:nonce`, with
/// transactions serialized as a JSON array in block order. Nothing is sorted.
pub fn digest(
    index: u64,
    previous_hash: &str,
    timestamp: i64,
    transactions: &[Transaction],
    nonce: u64,
) -> String {
    // Plain structs of strings and integers always serialize.
    let txs_json = serde_json::to_string(transactions).expect("serialize txs");
    let preimage = format!("{index}:{previous_hash}:{timestamp}:{txs_json}:{nonce}");
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when the first `difficulty` hex characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|c| c == b'0')
}
