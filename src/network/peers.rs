use std::collections::BTreeSet;

/// Known peer addresses (`host:port` or a base URL). Membership only; peers
/// are never evicted.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: BTreeSet<String>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer. Returns `false` for blanks and addresses already known.
    pub fn register(&mut self, address: &str) -> bool {
        let address = normalize(address);
        if address.is_empty() {
            return false;
        }
        self.peers.insert(address)
    }

    /// Owned copy of the current members, for use without holding a lock.
    pub fn snapshot(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

fn normalize(address: &str) -> String {
    address.trim().trim_end_matches('/').to_string()
}
