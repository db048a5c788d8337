use std::future::Future;
use std::time::Duration;

use actix_web::rt::time::timeout;
use log::{debug, info, warn};
use serde::Serialize;

use crate::blockchain::{Block, Blockchain};
use crate::error::PeerError;
use crate::node::{BlockReceipt, Node};
use crate::transaction::Transaction;

/// Network capability used to talk to peers.
pub trait PeerTransport {
    /// Fetch the full chain a peer claims to hold.
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<Vec<Block>, PeerError>>;

    /// Push a freshly mined block to a peer.
    fn send_block(&self, peer: &str, block: &Block) -> impl Future<Output = Result<(), PeerError>>;

    /// Relay a client transaction. The peer queues it without gossiping
    /// it further.
    fn send_transaction(
        &self,
        peer: &str,
        tx: &Transaction,
    ) -> impl Future<Output = Result<(), PeerError>>;

    /// Ask a peer to register `address` (ours) without announcing back.
    fn announce(&self, peer: &str, address: &str) -> impl Future<Output = Result<(), PeerError>>;
}

/// What happened to a block pushed to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveOutcome {
    Accepted,
    Duplicate,
    /// The block did not attach, but a sync pulled in a longer chain.
    Synced,
    Rejected,
}

impl ReceiveOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, ReceiveOutcome::Rejected)
    }
}

/// Fork choice and block fan-out against the peers a node knows about.
pub struct SyncEngine<T> {
    transport: T,
    peer_timeout: Duration,
    /// Address peers should use to reach us, sent when we register them.
    advertise: Option<String>,
}

impl<T: PeerTransport> SyncEngine<T> {
    pub fn new(transport: T, peer_timeout: Duration) -> Self {
        Self {
            transport,
            peer_timeout,
            advertise: None,
        }
    }

    pub fn advertising(mut self, address: Option<String>) -> Self {
        self.advertise = address;
        self
    }

    /// Pull every peer's chain and adopt the longest valid one if it is
    /// strictly longer than ours. Unreachable or misbehaving peers are
    /// skipped. Returns whether the local chain was replaced.
    pub async fn resolve(&self, node: &Node) -> bool {
        let peers = node.peers();
        let difficulty = node.difficulty();
        let mut best: Option<(String, Vec<Block>)> = None;

        for peer in &peers {
            let candidate = match self.fetch_chain(peer).await {
                Ok(chain) => chain,
                Err(e) => {
                    warn!("SYNC - skipping {peer}: {e}");
                    continue;
                }
            };

            let best_len = best
                .as_ref()
                .map_or_else(|| node.chain_len(), |(_, chain)| chain.len());
            if candidate.len() <= best_len {
                debug!(
                    "SYNC - {peer} offers {} blocks, not longer than {best_len}",
                    candidate.len()
                );
                continue;
            }
            if !Blockchain::validate_chain(&candidate, difficulty) {
                warn!("SYNC - {peer} offers an invalid chain of {} blocks", candidate.len());
                continue;
            }
            best = Some((peer.clone(), candidate));
        }

        let Some((peer, chain)) = best else {
            if peers.is_empty() {
                debug!("SYNC - no peers known, nothing to resolve");
            } else {
                debug!("SYNC - local chain is up to date ({} peers)", peers.len());
            }
            return false;
        };

        let len = chain.len();
        let replaced = node.adopt_chain(chain);
        if replaced {
            info!("SYNC - adopted chain of {len} blocks from {peer}");
        }
        replaced
    }

    /// Best-effort fan-out of a block to every known peer. Returns how many
    /// peers took it; failures are logged and otherwise ignored.
    pub async fn broadcast(&self, block: &Block, peers: &[String]) -> usize {
        let mut delivered = 0;
        for peer in peers {
            match self.send_block(peer, block).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("BROADCAST - block #{} to {peer} failed: {e}", block.index),
            }
        }
        debug!(
            "BROADCAST - block #{} delivered to {delivered}/{} peers",
            block.index,
            peers.len()
        );
        delivered
    }

    /// Best-effort relay of a client transaction to every known peer.
    /// Returns how many peers took it.
    pub async fn broadcast_transaction(&self, tx: &Transaction, peers: &[String]) -> usize {
        let mut delivered = 0;
        for peer in peers {
            let sent = self
                .bounded(peer, self.transport.send_transaction(peer, tx))
                .await;
            match sent {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    "BROADCAST - tx {} -> {} to {peer} failed: {e}",
                    tx.sender, tx.recipient
                ),
            }
        }
        debug!(
            "BROADCAST - tx {} -> {} relayed to {delivered}/{} peers",
            tx.sender,
            tx.recipient,
            peers.len()
        );
        delivered
    }

    /// Tell a newly registered peer about us so the link goes both ways.
    /// Returns `false` when we have no address to advertise or the peer
    /// could not be reached.
    pub async fn announce(&self, peer: &str) -> bool {
        let Some(address) = self.advertise.as_deref() else {
            return false;
        };
        match self.bounded(peer, self.transport.announce(peer, address)).await {
            Ok(()) => {
                info!("SYNC - announced {address} to {peer}");
                true
            }
            Err(e) => {
                warn!("SYNC - announcing to {peer} failed: {e}");
                false
            }
        }
    }

    /// Attach a pushed block, falling back to a full sync when it reveals
    /// that we are behind.
    pub async fn receive_block(&self, node: &Node, block: Block) -> ReceiveOutcome {
        match node.receive_block(block) {
            BlockReceipt::Accepted => ReceiveOutcome::Accepted,
            BlockReceipt::Duplicate => ReceiveOutcome::Duplicate,
            BlockReceipt::Rejected(_) => ReceiveOutcome::Rejected,
            BlockReceipt::Orphan => {
                if self.resolve(node).await {
                    ReceiveOutcome::Synced
                } else {
                    ReceiveOutcome::Rejected
                }
            }
        }
    }

    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        self.bounded(peer, self.transport.fetch_chain(peer)).await
    }

    async fn send_block(&self, peer: &str, block: &Block) -> Result<(), PeerError> {
        self.bounded(peer, self.transport.send_block(peer, block)).await
    }

    /// Run one peer round-trip under the per-peer timeout.
    async fn bounded<R>(
        &self,
        peer: &str,
        call: impl Future<Output = Result<R, PeerError>>,
    ) -> Result<R, PeerError> {
        timeout(self.peer_timeout, call)
            .await
            .map_err(|_| PeerError::Timeout {
                peer: peer.to_string(),
                after: self.peer_timeout,
            })?
    }
}
