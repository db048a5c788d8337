use serde::{Deserialize, Serialize};

/// A transfer between two opaque identifiers. No balance or signature
/// semantics are attached; equality is by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Block reward paid out of thin air by the `System` sender.
    pub fn reward(recipient: impl Into<String>, amount: u64) -> Self {
        Self::new(crate::blockchain::REWARD_SENDER, recipient, amount)
    }
}
