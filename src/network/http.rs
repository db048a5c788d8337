use std::time::Duration;

use awc::Client;
use log::debug;
use serde::Serialize;

use super::PeerTransport;
use crate::api::models::{ChainResponse, NewTxRequest, RegisterPeerRequest};
use crate::blockchain::Block;
use crate::error::PeerError;
use crate::transaction::Transaction;

/// Largest chain body accepted from a peer.
const MAX_CHAIN_BYTES: usize = 16 * 1024 * 1024;

/// Talks to peers through their REST API (`/api/v1/chain/`, `/api/v1/blocks/`,
/// `/api/v1/tx/`, `/api/v1/peers/`).
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).finish(),
        }
    }

    fn url(peer: &str, path: &str) -> String {
        if peer.starts_with("http://") || peer.starts_with("https://") {
            format!("{peer}{path}")
        } else {
            format!("http://{peer}{path}")
        }
    }

    async fn post_json(&self, peer: &str, path: &str, body: &impl Serialize) -> Result<(), PeerError> {
        let url = Self::url(peer, path);
        debug!("POST {url}");

        let resp = self
            .client
            .post(&url)
            .send_json(body)
            .await
            .map_err(|e| PeerError::Unreachable {
                peer: peer.to_string(),
                reason: e.to_string(),
            })?;
        // A peer refusing the payload (4xx) still received it.
        if resp.status().is_server_error() {
            return Err(PeerError::MalformedResponse {
                peer: peer.to_string(),
                reason: format!("status {}", resp.status()),
            });
        }
        Ok(())
    }
}

impl PeerTransport for HttpTransport {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        let url = Self::url(peer, "/api/v1/chain/");
        debug!("GET {url}");

        let mut resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PeerError::Unreachable {
                peer: peer.to_string(),
                reason: e.to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(PeerError::MalformedResponse {
                peer: peer.to_string(),
                reason: format!("status {}", resp.status()),
            });
        }

        let body: ChainResponse = resp.json().limit(MAX_CHAIN_BYTES).await.map_err(|e| {
            PeerError::MalformedResponse {
                peer: peer.to_string(),
                reason: e.to_string(),
            }
        })?;
        if body.length != body.chain.len() {
            return Err(PeerError::MalformedResponse {
                peer: peer.to_string(),
                reason: format!(
                    "declared length {} but sent {} blocks",
                    body.length,
                    body.chain.len()
                ),
            });
        }
        Ok(body.chain)
    }

    async fn send_block(&self, peer: &str, block: &Block) -> Result<(), PeerError> {
        debug!("POST {peer} block #{}", block.index);
        self.post_json(peer, "/api/v1/blocks/", block).await
    }

    async fn send_transaction(&self, peer: &str, tx: &Transaction) -> Result<(), PeerError> {
        let body = NewTxRequest {
            sender: tx.sender.clone(),
            recipient: tx.recipient.clone(),
            amount: tx.amount,
            relayed: true,
        };
        self.post_json(peer, "/api/v1/tx/", &body).await
    }

    async fn announce(&self, peer: &str, address: &str) -> Result<(), PeerError> {
        let body = RegisterPeerRequest {
            address: address.to_string(),
            relayed: true,
        };
        self.post_json(peer, "/api/v1/peers/", &body).await
    }
}
