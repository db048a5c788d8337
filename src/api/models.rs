use serde::{Deserialize, Serialize};

use crate::blockchain::Block;
use crate::network::{HttpTransport, ReceiveOutcome, SyncEngine};
use crate::transaction::Transaction;

/// Sync engine shared by the handlers of one worker.
pub type Engine = SyncEngine<HttpTransport>;

/* ---------- Chain API Models ---------- */

/// Also the body peers fetch during sync.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub length: usize,
    pub difficulty: u32,
    pub chain: Vec<Block>,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct MineRequest {
    pub miner_address: String,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
    /// Peers that took the broadcast.
    pub delivered_to: usize,
}

/* ---------- TX API Models ---------- */

/// Whole, non-negative units only: fractional or negative amounts fail to
/// deserialize and the request is refused.
#[derive(Serialize, Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
    /// Set by a peer relaying the transaction; relayed ones are not gossiped
    /// again.
    #[serde(default)]
    pub relayed: bool,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub position: usize,
    pub block_index: u64,
    /// Peers the transaction was relayed to.
    pub relayed_to: usize,
}

#[derive(Serialize)]
pub struct MempoolResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Peer API Models ---------- */

#[derive(Serialize, Deserialize)]
pub struct RegisterPeerRequest {
    pub address: String,
    /// Set when a peer announces itself; we do not announce back.
    #[serde(default)]
    pub relayed: bool,
}

#[derive(Serialize)]
pub struct PeersResponse {
    pub added: Option<bool>,
    pub announced: Option<bool>,
    pub peers: Vec<String>,
}

/* ---------- Consensus API Models ---------- */

#[derive(Deserialize)]
pub struct StakeEntry {
    pub node: String,
    pub stake: u64,
}

#[derive(Deserialize)]
pub struct ProducerRequest {
    pub stakes: Vec<StakeEntry>,
}

#[derive(Serialize)]
pub struct ProducerResponse {
    pub producer: Option<String>,
    pub total_stake: u64,
}

#[derive(Serialize)]
pub struct ReceiveBlockResponse {
    pub accepted: bool,
    pub outcome: ReceiveOutcome,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub replaced: bool,
    pub length: usize,
}
