use std::time::Duration;

use thiserror::Error;

/// Failures raised by the local chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("invalid block: {0}")]
    InvalidBlock(String),
}

/// Failures raised by a mining attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MineError {
    #[error("no pending transactions to mine")]
    NothingToMine,

    #[error("mining was cancelled")]
    Cancelled,

    /// The search finished but the tip moved underneath it.
    #[error("mined block no longer extends the tip: {0}")]
    Stale(ChainError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Per-peer transport failures. These never escape `resolve` or `broadcast`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerError {
    #[error("peer {peer} is unreachable: {reason}")]
    Unreachable { peer: String, reason: String },

    #[error("peer {peer} timed out after {after:?}")]
    Timeout { peer: String, after: Duration },

    #[error("malformed response from {peer}: {reason}")]
    MalformedResponse { peer: String, reason: String },
}
